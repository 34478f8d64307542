//! Day-over-day rank deltas across reporting bands.
//!
//! Ranks exist only among the symbols present in a day's row — a symbol
//! absent on a day has no rank that day, not a worst-case rank. Ties break
//! by lexicographic symbol order: rows iterate alphabetically and the sort
//! is stable.
//!
//! Deltas are scoped to *today's* top bands. A symbol that fell out of the
//! top 30 entirely produces no signal here; the moving-average report in
//! [`crate::analysis::momentum`] is the only exit tracker.

use crate::store::{CapHistory, CapRow};
use std::cmp::Ordering;

/// Symbols ranked 1..=TOP_BAND form the headline section.
pub const TOP_BAND: usize = 10;

/// Symbols ranked TOP_BAND+1..=MID_BAND form the secondary section.
pub const MID_BAND: usize = 30;

/// Total order over one day's symbols by descending market cap (1 = largest).
#[derive(Debug, Clone)]
pub struct RankSnapshot {
    ranked: Vec<(String, f64)>,
}

impl RankSnapshot {
    pub fn from_row(row: &CapRow) -> Self {
        let mut ranked: Vec<(String, f64)> =
            row.iter().map(|(s, c)| (s.clone(), *c)).collect();
        // Stable sort over alphabetical input: equal caps keep symbol order.
        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
        Self { ranked }
    }

    /// 1-based rank of a symbol, if present that day.
    pub fn rank_of(&self, symbol: &str) -> Option<usize> {
        self.ranked
            .iter()
            .position(|(s, _)| s == symbol)
            .map(|i| i + 1)
    }

    /// Symbols in a 1-based inclusive rank band, in rank order.
    pub fn band(&self, from: usize, to: usize) -> impl Iterator<Item = &str> {
        let lo = from.saturating_sub(1).min(self.ranked.len());
        let hi = to.min(self.ranked.len());
        self.ranked[lo..hi].iter().map(|(s, _)| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.ranked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranked.is_empty()
    }
}

/// Whether a change moved up, down, or not at all. Flat is its own state,
/// not a degenerate Up or Down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Flat,
}

impl Direction {
    /// Direction of a percentage change.
    pub fn of_change(pct: f64) -> Self {
        if pct > 0.0 {
            Direction::Up
        } else if pct < 0.0 {
            Direction::Down
        } else {
            Direction::Flat
        }
    }
}

/// A symbol whose rank differs from the prior day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankMove {
    pub symbol: String,
    pub prev: usize,
    pub now: usize,
}

impl RankMove {
    /// Up when the rank number shrank (closer to 1).
    pub fn direction(&self) -> Direction {
        if self.now < self.prev {
            Direction::Up
        } else {
            Direction::Down
        }
    }
}

/// Day-over-day rank comparison, or the warm-up placeholder state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RankDeltaReport {
    /// Fewer than two rows exist; analysis starts on day two.
    Warmup { rows: usize },
    Ready {
        /// Moves among today's top 10, in today's rank order.
        top_moves: Vec<RankMove>,
        /// Moves among today's ranks 11–30, in today's rank order.
        mid_moves: Vec<RankMove>,
    },
}

/// Compare the latest row's ranking against the prior row's.
///
/// Only symbols with a defined prior rank qualify — a new entrant has no
/// delta to report.
pub fn rank_deltas(history: &CapHistory) -> RankDeltaReport {
    let Some(((_, prev_row), (_, latest_row))) = history.last_two() else {
        return RankDeltaReport::Warmup {
            rows: history.len(),
        };
    };

    let today = RankSnapshot::from_row(latest_row);
    let prior = RankSnapshot::from_row(prev_row);

    let moves_in_band = |from: usize, to: usize| -> Vec<RankMove> {
        today
            .band(from, to)
            .filter_map(|symbol| {
                let now = today.rank_of(symbol)?;
                let prev = prior.rank_of(symbol)?;
                (now != prev).then(|| RankMove {
                    symbol: symbol.to_string(),
                    prev,
                    now,
                })
            })
            .collect()
    };

    RankDeltaReport::Ready {
        top_moves: moves_in_band(1, TOP_BAND),
        mid_moves: moves_in_band(TOP_BAND + 1, MID_BAND),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, day).unwrap()
    }

    fn row(pairs: &[(&str, f64)]) -> CapRow {
        pairs.iter().map(|(s, c)| (s.to_string(), *c)).collect()
    }

    #[test]
    fn snapshot_ranks_descending() {
        let snap = RankSnapshot::from_row(&row(&[("X", 100.0), ("Y", 90.0), ("Z", 80.0)]));
        assert_eq!(snap.rank_of("X"), Some(1));
        assert_eq!(snap.rank_of("Y"), Some(2));
        assert_eq!(snap.rank_of("Z"), Some(3));
        assert_eq!(snap.rank_of("ABSENT"), None);
    }

    #[test]
    fn ties_break_alphabetically() {
        let snap = RankSnapshot::from_row(&row(&[("ZZZ", 50.0), ("AAA", 50.0), ("MMM", 50.0)]));
        assert_eq!(snap.rank_of("AAA"), Some(1));
        assert_eq!(snap.rank_of("MMM"), Some(2));
        assert_eq!(snap.rank_of("ZZZ"), Some(3));
    }

    #[test]
    fn band_is_one_based_inclusive() {
        let snap = RankSnapshot::from_row(&row(&[
            ("A", 40.0),
            ("B", 30.0),
            ("C", 20.0),
            ("D", 10.0),
        ]));
        let mid: Vec<_> = snap.band(2, 3).collect();
        assert_eq!(mid, vec!["B", "C"]);
        // Band past the end is clamped, not a panic.
        let tail: Vec<_> = snap.band(3, 10).collect();
        assert_eq!(tail, vec!["C", "D"]);
    }

    #[test]
    fn single_row_is_warmup() {
        let mut h = CapHistory::new();
        h.upsert(d(1), row(&[("X", 100.0)]));
        assert_eq!(rank_deltas(&h), RankDeltaReport::Warmup { rows: 1 });
    }

    #[test]
    fn unchanged_order_reports_no_moves() {
        // Caps move but the ordering X > Y > Z holds.
        let mut h = CapHistory::new();
        h.upsert(d(1), row(&[("X", 100.0), ("Y", 90.0), ("Z", 80.0)]));
        h.upsert(d(2), row(&[("X", 95.0), ("Y", 92.0), ("Z", 85.0)]));

        let RankDeltaReport::Ready {
            top_moves,
            mid_moves,
        } = rank_deltas(&h)
        else {
            panic!("expected ready report");
        };
        assert!(top_moves.is_empty());
        assert!(mid_moves.is_empty());
    }

    #[test]
    fn swap_reports_both_moves() {
        let mut h = CapHistory::new();
        h.upsert(d(1), row(&[("X", 100.0), ("Y", 90.0)]));
        h.upsert(d(2), row(&[("X", 88.0), ("Y", 90.0)]));

        let RankDeltaReport::Ready { top_moves, .. } = rank_deltas(&h) else {
            panic!("expected ready report");
        };
        assert_eq!(
            top_moves,
            vec![
                RankMove {
                    symbol: "Y".into(),
                    prev: 2,
                    now: 1,
                },
                RankMove {
                    symbol: "X".into(),
                    prev: 1,
                    now: 2,
                },
            ]
        );
        assert_eq!(top_moves[0].direction(), Direction::Up);
        assert_eq!(top_moves[1].direction(), Direction::Down);
    }

    #[test]
    fn new_entrant_is_not_a_move() {
        let mut h = CapHistory::new();
        h.upsert(d(1), row(&[("X", 100.0)]));
        h.upsert(d(2), row(&[("X", 100.0), ("NEW", 200.0)]));

        let RankDeltaReport::Ready { top_moves, .. } = rank_deltas(&h) else {
            panic!("expected ready report");
        };
        // NEW took rank 1 but has no prior rank; X slid 1 → 2.
        assert_eq!(top_moves.len(), 1);
        assert_eq!(top_moves[0].symbol, "X");
    }

    #[test]
    fn mid_band_move_direction() {
        // 31 symbols; S15 and S20 swap ranks inside the 11–30 band.
        let day1: Vec<(String, f64)> = (1..=31)
            .map(|i| (format!("S{i:02}"), 1000.0 - i as f64))
            .collect();
        let mut day2 = day1.clone();
        // Give S20 a cap just above S15's.
        day2[19].1 = day2[14].1 + 0.5;

        let to_row = |v: &[(String, f64)]| -> CapRow { v.iter().cloned().collect() };
        let mut h = CapHistory::new();
        h.upsert(d(1), to_row(&day1));
        h.upsert(d(2), to_row(&day2));

        let RankDeltaReport::Ready {
            top_moves,
            mid_moves,
        } = rank_deltas(&h)
        else {
            panic!("expected ready report");
        };
        assert!(top_moves.is_empty());

        let s20 = mid_moves.iter().find(|m| m.symbol == "S20").unwrap();
        assert_eq!(s20.direction(), Direction::Up);
        assert!(s20.now < s20.prev);
    }

    #[test]
    fn direction_of_change_zero_is_flat() {
        assert_eq!(Direction::of_change(0.12), Direction::Up);
        assert_eq!(Direction::of_change(-0.5), Direction::Down);
        assert_eq!(Direction::of_change(0.0), Direction::Flat);
    }
}
