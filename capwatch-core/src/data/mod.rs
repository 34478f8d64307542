//! Market data access: provider trait, Yahoo Finance client, batch fetch.

pub mod fetch;
pub mod provider;
pub mod table;
pub mod yahoo;

pub use fetch::{fetch_close_table, fetch_share_counts, SkippedSymbol};
pub use provider::{DataError, QuoteProvider};
pub use table::PriceTable;
pub use yahoo::YahooProvider;
