//! Quote provider trait and structured error types.
//!
//! The QuoteProvider trait abstracts over the market-data source so the
//! pipeline can run against Yahoo Finance in production and a mock in tests.

use chrono::NaiveDate;
use thiserror::Error;

/// Structured error types for quote operations.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("network error: {0}")]
    Network(String),

    #[error("HTTP {status} from provider for {symbol}")]
    HttpStatus { symbol: String, status: u16 },

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("symbol not found: {symbol}")]
    SymbolNotFound { symbol: String },

    #[error("no shares outstanding reported for {symbol}")]
    MissingShares { symbol: String },

    #[error("not enough data: {0}")]
    NotEnoughData(String),
}

/// Trait for quote sources (Yahoo Finance, mocks).
///
/// Every call is attempted exactly once; retry policy is deliberately out of
/// scope. Callers that sweep many symbols isolate per-symbol failures via the
/// helpers in [`crate::data::fetch`].
pub trait QuoteProvider: Send + Sync {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    /// Daily closing prices for a symbol over a date range (inclusive).
    ///
    /// Dates with no trading (holidays, weekends) are simply absent.
    fn close_series(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<(NaiveDate, f64)>, DataError>;

    /// Outstanding share count for a symbol at fetch time.
    fn shares_outstanding(&self, symbol: &str) -> Result<u64, DataError>;
}
