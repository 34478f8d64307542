//! The one-shot run: macro stage, market-cap stage, delivery.
//!
//! Stages are independent — a stage-level failure becomes that stage's
//! message text while the other stage still runs. Delivery failures are
//! logged and never abort; the caller always gets a full summary.

use anyhow::{bail, Context, Result};
use capwatch_core::analysis::{momentum_shift, rank_deltas, MomentumReport, RankDeltaReport};
use capwatch_core::data::{fetch_close_table, fetch_share_counts, QuoteProvider};
use capwatch_core::macroview::{macro_snapshot, MacroSnapshot};
use capwatch_core::notify::MessageSink;
use capwatch_core::store::backfill::backfill;
use capwatch_core::store::{cap_row, CapHistory};
use chrono::{Duration, NaiveDate};
use std::collections::BTreeSet;

use crate::config::RunConfig;
use crate::report;

/// Calendar days fetched to find the latest close for today's snapshot
/// (covers weekends and short holiday stretches).
const TODAY_LOOKBACK_DAYS: i64 = 4;

/// Everything the market-cap stage derived for one run.
#[derive(Debug)]
pub struct McapAnalysis {
    pub date: NaiveDate,
    pub deltas: RankDeltaReport,
    pub momentum: MomentumReport,
    /// Distinct watchlist symbols that dropped out of any sweep this run.
    pub skipped_symbols: usize,
    pub backfilled: bool,
    pub rows: usize,
}

/// What a run produced and whether each message got through.
#[derive(Debug)]
pub struct RunSummary {
    pub macro_text: String,
    pub mcap_text: String,
    pub macro_delivered: bool,
    pub mcap_delivered: bool,
}

/// Execute one full run: build both messages, send both, report back.
/// Never fails — every error path folds into message text or a log line.
pub fn run_once(
    provider: &dyn QuoteProvider,
    sink: &dyn MessageSink,
    config: &RunConfig,
    today: NaiveDate,
) -> RunSummary {
    let macro_text = match macro_stage(provider, config, today) {
        Ok(snapshot) => report::render_macro(&snapshot),
        Err(e) => {
            tracing::error!(error = %e, "macro stage failed");
            report::render_macro_error(today, &e.to_string())
        }
    };

    let mcap_text = match mcap_stage(provider, config, today) {
        Ok(analysis) => report::render_mcap(&analysis),
        Err(e) => {
            tracing::error!(error = %e, "market-cap stage failed");
            report::render_mcap_error(today, &format!("{e:#}"))
        }
    };

    let macro_delivered = deliver(sink, "macro", &macro_text);
    let mcap_delivered = deliver(sink, "market-cap", &mcap_text);

    RunSummary {
        macro_text,
        mcap_text,
        macro_delivered,
        mcap_delivered,
    }
}

fn deliver(sink: &dyn MessageSink, label: &str, text: &str) -> bool {
    match sink.send(text) {
        Ok(()) => {
            tracing::info!(sink = sink.name(), label, "message delivered");
            true
        }
        Err(e) => {
            tracing::warn!(sink = sink.name(), label, error = %e, "delivery failed");
            false
        }
    }
}

fn macro_stage(
    provider: &dyn QuoteProvider,
    config: &RunConfig,
    today: NaiveDate,
) -> Result<MacroSnapshot> {
    let snapshot = macro_snapshot(provider, &config.macro_indicators, today)?;
    tracing::info!(
        indicators = snapshot.lines.len(),
        skipped = snapshot.skipped.len(),
        "macro snapshot built"
    );
    Ok(snapshot)
}

/// Load (or rebuild) the history, append today's row, persist, analyze.
pub fn mcap_stage(
    provider: &dyn QuoteProvider,
    config: &RunConfig,
    today: NaiveDate,
) -> Result<McapAnalysis> {
    let mut history =
        CapHistory::load(&config.store_path).context("load market-cap history")?;

    let mut skipped: BTreeSet<String> = BTreeSet::new();
    let mut backfilled = false;

    if history.needs_backfill() {
        tracing::info!(rows = history.len(), "history too short; backfilling");
        let (rebuilt, bf) = backfill(provider, &config.watchlist, today);
        skipped.extend(bf.skipped_shares.iter().map(|s| s.symbol.clone()));
        skipped.extend(bf.skipped_prices.iter().map(|s| s.symbol.clone()));
        history = rebuilt;
        // Persist immediately so a later failure can't discard the
        // expensive reconstruction.
        history
            .save(&config.store_path)
            .context("persist backfilled history")?;
        backfilled = true;
    }

    // Today's snapshot: latest close per symbol plus a fresh share sweep.
    let start = today - Duration::days(TODAY_LOOKBACK_DAYS);
    let (table, skipped_prices) = fetch_close_table(provider, &config.watchlist, start, today);
    skipped.extend(skipped_prices.into_iter().map(|s| s.symbol));

    let Some((_, closes)) = table.latest() else {
        bail!("no closes returned for any watchlist symbol");
    };

    let (shares, skipped_shares) = fetch_share_counts(provider, &config.watchlist);
    skipped.extend(skipped_shares.into_iter().map(|s| s.symbol));

    let row = cap_row(closes, &shares);
    if row.is_empty() {
        bail!("no market caps could be computed for today");
    }

    history.upsert(today, row);
    history
        .save(&config.store_path)
        .context("save market-cap history")?;

    tracing::info!(
        rows = history.len(),
        backfilled,
        skipped = skipped.len(),
        "market-cap history updated"
    );

    Ok(McapAnalysis {
        date: today,
        deltas: rank_deltas(&history),
        momentum: momentum_shift(&history),
        skipped_symbols: skipped.len(),
        backfilled,
        rows: history.len(),
    })
}
