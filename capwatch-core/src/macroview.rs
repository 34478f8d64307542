//! Macro indicator snapshot — day-over-day changes for FX, futures,
//! indices, and yields.
//!
//! Unlike the market-cap path, this path forward-fills gaps: a stale close
//! is acceptable for display, while market caps must never be computed from
//! one. That asymmetry is deliberate.

use crate::analysis::Direction;
use crate::data::{fetch_close_table, DataError, QuoteProvider, SkippedSymbol};
use chrono::{Duration, NaiveDate};

/// Calendar days of history fetched to guarantee two trading days.
pub const MACRO_LOOKBACK_DAYS: i64 = 7;

/// A macro indicator: display name + provider ticker.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct IndicatorSpec {
    pub name: String,
    pub ticker: String,
}

/// One indicator's latest value and day-over-day change.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorLine {
    pub name: String,
    pub value: f64,
    pub change_pct: f64,
    pub direction: Direction,
}

/// The rendered-ready macro snapshot for one day.
#[derive(Debug)]
pub struct MacroSnapshot {
    pub date: NaiveDate,
    pub lines: Vec<IndicatorLine>,
    pub skipped: Vec<SkippedSymbol>,
}

/// Fetch a trailing close table for the configured indicators and compare
/// the last two rows. Indicators still missing after forward-fill are
/// omitted; an unusable table (fewer than two rows) is a stage-level error.
pub fn macro_snapshot(
    provider: &dyn QuoteProvider,
    indicators: &[IndicatorSpec],
    today: NaiveDate,
) -> Result<MacroSnapshot, DataError> {
    let tickers: Vec<String> = indicators.iter().map(|i| i.ticker.clone()).collect();
    let start = today - Duration::days(MACRO_LOOKBACK_DAYS);

    let (mut table, skipped) = fetch_close_table(provider, &tickers, start, today);
    table.forward_fill();

    let Some(((_, prev_row), (date, latest_row))) = table.last_two() else {
        return Err(DataError::NotEnoughData(format!(
            "{} of {} indicators returned closes, fewer than 2 trading days",
            table.symbols().len(),
            indicators.len()
        )));
    };

    let mut lines = Vec::with_capacity(indicators.len());
    for spec in indicators {
        let (Some(value), Some(prev)) = (
            latest_row.get(&spec.ticker),
            prev_row.get(&spec.ticker),
        ) else {
            continue;
        };
        let change_pct = (value - prev) / prev * 100.0;
        lines.push(IndicatorLine {
            name: spec.name.clone(),
            value: *value,
            change_pct,
            direction: Direction::of_change(change_pct),
        });
    }

    Ok(MacroSnapshot {
        date: *date,
        lines,
        skipped,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    struct TableProvider {
        // ticker → dated closes
        series: BTreeMap<&'static str, Vec<(NaiveDate, f64)>>,
    }

    impl QuoteProvider for TableProvider {
        fn name(&self) -> &str {
            "table"
        }

        fn close_series(
            &self,
            symbol: &str,
            _start: NaiveDate,
            _end: NaiveDate,
        ) -> Result<Vec<(NaiveDate, f64)>, DataError> {
            self.series
                .get(symbol)
                .cloned()
                .ok_or_else(|| DataError::SymbolNotFound {
                    symbol: symbol.to_string(),
                })
        }

        fn shares_outstanding(&self, symbol: &str) -> Result<u64, DataError> {
            Err(DataError::MissingShares {
                symbol: symbol.to_string(),
            })
        }
    }

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, day).unwrap()
    }

    fn spec(name: &str, ticker: &str) -> IndicatorSpec {
        IndicatorSpec {
            name: name.into(),
            ticker: ticker.into(),
        }
    }

    #[test]
    fn snapshot_compares_last_two_days() {
        let provider = TableProvider {
            series: [
                ("GC=F", vec![(d(1), 2000.0), (d(2), 2020.0)]),
                ("CL=F", vec![(d(1), 80.0), (d(2), 78.0)]),
            ]
            .into_iter()
            .collect(),
        };
        let specs = [spec("Gold Futures", "GC=F"), spec("WTI Crude", "CL=F")];

        let snap = macro_snapshot(&provider, &specs, d(2)).unwrap();

        assert_eq!(snap.date, d(2));
        assert_eq!(snap.lines.len(), 2);

        let gold = &snap.lines[0];
        assert_eq!(gold.name, "Gold Futures");
        assert!((gold.change_pct - 1.0).abs() < 1e-9);
        assert_eq!(gold.direction, Direction::Up);

        let oil = &snap.lines[1];
        assert!((oil.change_pct + 2.5).abs() < 1e-9);
        assert_eq!(oil.direction, Direction::Down);
    }

    #[test]
    fn forward_fill_covers_indicator_gaps() {
        // Gold has no close on day 3; its day-2 close carries forward, so
        // the day-3 snapshot shows a flat gold line instead of omitting it.
        let provider = TableProvider {
            series: [
                ("GC=F", vec![(d(1), 2000.0), (d(2), 2020.0)]),
                ("CL=F", vec![(d(1), 80.0), (d(2), 79.0), (d(3), 81.0)]),
            ]
            .into_iter()
            .collect(),
        };
        let specs = [spec("Gold Futures", "GC=F"), spec("WTI Crude", "CL=F")];

        let snap = macro_snapshot(&provider, &specs, d(3)).unwrap();

        assert_eq!(snap.date, d(3));
        let gold = snap
            .lines
            .iter()
            .find(|l| l.name == "Gold Futures")
            .unwrap();
        assert!((gold.value - 2020.0).abs() < 1e-9);
        assert_eq!(gold.direction, Direction::Flat);
    }

    #[test]
    fn failed_indicator_is_omitted_not_fatal() {
        let provider = TableProvider {
            series: [("GC=F", vec![(d(1), 2000.0), (d(2), 2020.0)])]
                .into_iter()
                .collect(),
        };
        let specs = [spec("Gold Futures", "GC=F"), spec("Ghost", "NOPE=X")];

        let snap = macro_snapshot(&provider, &specs, d(2)).unwrap();

        assert_eq!(snap.lines.len(), 1);
        assert_eq!(snap.skipped.len(), 1);
        assert_eq!(snap.skipped[0].symbol, "NOPE=X");
    }

    #[test]
    fn empty_table_is_stage_error() {
        let provider = TableProvider {
            series: BTreeMap::new(),
        };
        let specs = [spec("Gold Futures", "GC=F")];

        let err = macro_snapshot(&provider, &specs, d(2)).unwrap_err();
        assert!(matches!(err, DataError::NotEnoughData(_)));
    }

    #[test]
    fn zero_change_is_flat_not_up() {
        let provider = TableProvider {
            series: [("GC=F", vec![(d(1), 2000.0), (d(2), 2000.0)])]
                .into_iter()
                .collect(),
        };
        let specs = [spec("Gold Futures", "GC=F")];

        let snap = macro_snapshot(&provider, &specs, d(2)).unwrap();
        assert_eq!(snap.lines[0].direction, Direction::Flat);
        assert_eq!(snap.lines[0].change_pct, 0.0);
    }
}
