//! History reconstruction for a missing or too-short store.
//!
//! One share-count request per watchlist symbol, then a single trailing
//! month of daily closes for the symbols that produced a positive count.
//! Expensive — callers gate this behind `CapHistory::needs_backfill`.

use super::{cap_row, CapHistory};
use crate::data::{fetch_close_table, fetch_share_counts, QuoteProvider, SkippedSymbol};
use chrono::{Duration, NaiveDate};

/// Trailing window of calendar days reconstructed by a backfill.
pub const BACKFILL_DAYS: i64 = 31;

/// What a backfill did and what it had to leave out.
#[derive(Debug)]
pub struct BackfillReport {
    pub rows: usize,
    pub skipped_shares: Vec<SkippedSymbol>,
    pub skipped_prices: Vec<SkippedSymbol>,
}

/// Rebuild a full trailing window of cap history from price history and
/// share counts. Rows exist only for dates where at least one symbol has
/// both a close and a positive share count.
pub fn backfill(
    provider: &dyn QuoteProvider,
    watchlist: &[String],
    end: NaiveDate,
) -> (CapHistory, BackfillReport) {
    let (shares, skipped_shares) = fetch_share_counts(provider, watchlist);

    let priced_symbols: Vec<String> = shares.keys().cloned().collect();
    let start = end - Duration::days(BACKFILL_DAYS);
    let (table, skipped_prices) = fetch_close_table(provider, &priced_symbols, start, end);

    let mut history = CapHistory::new();
    for (date, closes) in table.rows() {
        let row = cap_row(closes, &shares);
        if !row.is_empty() {
            history.upsert(*date, row);
        }
    }

    let report = BackfillReport {
        rows: history.len(),
        skipped_shares,
        skipped_prices,
    };
    (history, report)
}
