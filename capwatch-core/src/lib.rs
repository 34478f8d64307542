//! CapWatch Core — quote providers, market-cap history, rank analysis, delivery.
//!
//! This crate contains everything the notifier pipeline is built from:
//! - Quote provider trait + Yahoo Finance implementation (daily closes,
//!   shares outstanding)
//! - Best-effort batch fetch helpers (partial results + skip lists)
//! - The persisted market-cap history store (flat CSV, one row per date)
//! - Backfill engine for reconstructing a trailing window of history
//! - Rank/trend analyzer (day-over-day band deltas, 20-day average
//!   top-30 membership)
//! - Macro indicator snapshot
//! - Message sink trait + Telegram implementation

pub mod analysis;
pub mod data;
pub mod macroview;
pub mod notify;
pub mod store;
