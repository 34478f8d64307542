//! Best-effort batch fetch: collect successes, report omissions.
//!
//! The external source is unreliable per-symbol, so a sweep over a watchlist
//! never aborts on one symbol's failure. Each helper returns the partial
//! result plus the list of skipped symbols with the error that sidelined
//! them.

use super::provider::{DataError, QuoteProvider};
use super::table::PriceTable;
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// A symbol that was dropped from a sweep, and why.
#[derive(Debug)]
pub struct SkippedSymbol {
    pub symbol: String,
    pub reason: DataError,
}

/// Fetch daily closes for every symbol over a date range, merged into one
/// table. Per-symbol failures land in the skip list.
pub fn fetch_close_table(
    provider: &dyn QuoteProvider,
    symbols: &[String],
    start: NaiveDate,
    end: NaiveDate,
) -> (PriceTable, Vec<SkippedSymbol>) {
    let mut table = PriceTable::new();
    let mut skipped = Vec::new();

    for symbol in symbols {
        match provider.close_series(symbol, start, end) {
            Ok(series) => table.merge_series(symbol, &series),
            Err(reason) => {
                tracing::debug!(symbol = %symbol, error = %reason, "close series skipped");
                skipped.push(SkippedSymbol {
                    symbol: symbol.clone(),
                    reason,
                });
            }
        }
    }

    (table, skipped)
}

/// Fetch outstanding share counts for every symbol. A count of zero is
/// treated as missing — the symbol must not enter market-cap computation.
pub fn fetch_share_counts(
    provider: &dyn QuoteProvider,
    symbols: &[String],
) -> (BTreeMap<String, u64>, Vec<SkippedSymbol>) {
    let mut counts = BTreeMap::new();
    let mut skipped = Vec::new();

    for symbol in symbols {
        match provider.shares_outstanding(symbol) {
            Ok(shares) if shares > 0 => {
                counts.insert(symbol.clone(), shares);
            }
            Ok(_) => {
                skipped.push(SkippedSymbol {
                    symbol: symbol.clone(),
                    reason: DataError::MissingShares {
                        symbol: symbol.clone(),
                    },
                });
            }
            Err(reason) => {
                tracing::debug!(symbol = %symbol, error = %reason, "share count skipped");
                skipped.push(SkippedSymbol {
                    symbol: symbol.clone(),
                    reason,
                });
            }
        }
    }

    (counts, skipped)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Provider that fails for configured symbols and serves a flat series
    /// for the rest.
    struct FlakyProvider {
        bad: Vec<&'static str>,
        zero_shares: Vec<&'static str>,
    }

    impl QuoteProvider for FlakyProvider {
        fn name(&self) -> &str {
            "flaky"
        }

        fn close_series(
            &self,
            symbol: &str,
            start: NaiveDate,
            _end: NaiveDate,
        ) -> Result<Vec<(NaiveDate, f64)>, DataError> {
            if self.bad.contains(&symbol) {
                return Err(DataError::SymbolNotFound {
                    symbol: symbol.to_string(),
                });
            }
            Ok(vec![(start, 100.0)])
        }

        fn shares_outstanding(&self, symbol: &str) -> Result<u64, DataError> {
            if self.bad.contains(&symbol) {
                return Err(DataError::Network("connection reset".into()));
            }
            if self.zero_shares.contains(&symbol) {
                return Ok(0);
            }
            Ok(1_000_000_000)
        }
    }

    fn symbols(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn close_sweep_isolates_failures() {
        let provider = FlakyProvider {
            bad: vec!["BAD"],
            zero_shares: vec![],
        };
        let start = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();

        let (table, skipped) =
            fetch_close_table(&provider, &symbols(&["AAPL", "BAD", "MSFT"]), start, end);

        assert_eq!(table.symbols().len(), 2);
        assert_eq!(skipped.len(), 1);
        assert_eq!(skipped[0].symbol, "BAD");
    }

    #[test]
    fn share_sweep_skips_zero_counts() {
        let provider = FlakyProvider {
            bad: vec!["BAD"],
            zero_shares: vec!["ZERO"],
        };

        let (counts, skipped) =
            fetch_share_counts(&provider, &symbols(&["AAPL", "ZERO", "BAD"]));

        assert_eq!(counts.len(), 1);
        assert!(counts.contains_key("AAPL"));
        assert_eq!(skipped.len(), 2);
        assert!(skipped
            .iter()
            .any(|s| s.symbol == "ZERO" && matches!(s.reason, DataError::MissingShares { .. })));
    }
}
