//! 20-day moving-average top-30 membership tracking.
//!
//! The slower-moving counterpart to the day-over-day deltas: a symbol's
//! trailing-20-row mean cap is ranked, and entries into / exits from the
//! top-30 set are reported. The mean for a window counts only the rows
//! where the symbol is present.

use crate::store::{CapHistory, CapRow};
use chrono::NaiveDate;
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use super::rank::MID_BAND;

/// Window length in rows (trading days).
pub const MA_WINDOW: usize = 20;

/// Size of the tracked membership set.
pub const MA_BAND: usize = MID_BAND;

/// A symbol that entered the top-30 mean-cap set, with its mean rank today.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MomentumEntry {
    pub symbol: String,
    pub mean_rank: usize,
}

/// Membership change between the trailing window and the prior window, or
/// the warm-up placeholder state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MomentumReport {
    /// Fewer than `need` rows collected so far.
    Warmup { have: usize, need: usize },
    Ready {
        /// In today's set but not yesterday's, ordered by mean rank.
        entered: Vec<MomentumEntry>,
        /// In yesterday's set but not today's, alphabetical.
        exited: Vec<String>,
    },
}

/// Mean cap per symbol over a window of rows, ranked descending.
/// Ties break by lexicographic symbol order (stable sort over sorted keys).
fn ranked_means(window: &[(NaiveDate, CapRow)]) -> Vec<(String, f64)> {
    let mut sums: BTreeMap<&str, (f64, usize)> = BTreeMap::new();
    for (_, row) in window {
        for (symbol, cap) in row {
            let entry = sums.entry(symbol).or_insert((0.0, 0));
            entry.0 += cap;
            entry.1 += 1;
        }
    }

    let mut means: Vec<(String, f64)> = sums
        .into_iter()
        .map(|(symbol, (sum, count))| (symbol.to_string(), sum / count as f64))
        .collect();
    means.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
    means
}

fn top_set(means: &[(String, f64)], n: usize) -> BTreeSet<&str> {
    means.iter().take(n).map(|(s, _)| s.as_str()).collect()
}

/// Compare top-30 membership of the trailing 20-row mean against the prior
/// 20-row window (rows `[-21..-1]`).
///
/// Entrants and exits are disjoint by construction: each is a one-sided
/// set difference of the two top-30 sets.
pub fn momentum_shift(history: &CapHistory) -> MomentumReport {
    if history.len() < MA_WINDOW {
        return MomentumReport::Warmup {
            have: history.len(),
            need: MA_WINDOW,
        };
    }

    let today_means = ranked_means(history.trailing(MA_WINDOW));
    let prior_means = ranked_means(history.prior_trailing(MA_WINDOW));

    let today_set = top_set(&today_means, MA_BAND);
    let prior_set = top_set(&prior_means, MA_BAND);

    let entered: Vec<MomentumEntry> = today_means
        .iter()
        .take(MA_BAND)
        .enumerate()
        .filter(|(_, (symbol, _))| !prior_set.contains(symbol.as_str()))
        .map(|(i, (symbol, _))| MomentumEntry {
            symbol: symbol.clone(),
            mean_rank: i + 1,
        })
        .collect();

    let exited: Vec<String> = prior_set
        .difference(&today_set)
        .map(|s| s.to_string())
        .collect();

    MomentumReport::Ready { entered, exited }
}
