//! Persisted market-cap history.
//!
//! A flat CSV keyed by date: header is `date` plus every symbol seen
//! historically (the column set grows as new symbols appear), one row per
//! date in ascending order. Cells are market caps in billions; an absent
//! value is an empty cell, never zero. Saves are atomic: write to `.tmp`,
//! rename into place.

pub mod backfill;

use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// One day's mapping symbol → market cap in billions. Sparse: only symbols
/// with both a valid close and a positive share count that day are present.
pub type CapRow = BTreeMap<String, f64>;

/// Minimum row count below which history is reconstructed from scratch.
pub const BACKFILL_THRESHOLD: usize = 20;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("store CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("malformed store: {0}")]
    Malformed(String),
}

/// Date-ascending sequence of cap rows with unique dates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CapHistory {
    rows: Vec<(NaiveDate, CapRow)>,
}

impl CapHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read persisted rows; an absent file yields an empty history.
    pub fn load(path: &Path) -> Result<Self, StoreError> {
        if !path.exists() {
            return Ok(Self::new());
        }

        let mut reader = csv::Reader::from_path(path)?;
        let headers = reader.headers()?.clone();
        if headers.is_empty() || &headers[0] != "date" {
            return Err(StoreError::Malformed(
                "first header column must be 'date'".into(),
            ));
        }

        let mut history = Self::new();
        for record in reader.records() {
            let record = record?;
            let date_field = record.get(0).ok_or_else(|| {
                StoreError::Malformed("row with no date column".into())
            })?;
            let date = NaiveDate::parse_from_str(date_field, "%Y-%m-%d")
                .map_err(|e| StoreError::Malformed(format!("bad date '{date_field}': {e}")))?;

            let mut row = CapRow::new();
            for (i, cell) in record.iter().enumerate().skip(1) {
                if cell.is_empty() {
                    continue; // absent, not zero
                }
                let symbol = headers.get(i).ok_or_else(|| {
                    StoreError::Malformed(format!("row wider than header at column {i}"))
                })?;
                let cap: f64 = cell.parse().map_err(|e| {
                    StoreError::Malformed(format!("bad cap for {symbol} on {date}: {e}"))
                })?;
                row.insert(symbol.to_string(), cap);
            }
            history.upsert(date, row);
        }

        Ok(history)
    }

    /// Persist as CSV, atomically (write-then-rename).
    pub fn save(&self, path: &Path) -> Result<(), StoreError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let columns: Vec<String> = self.symbols().into_iter().collect();

        let mut writer = csv::Writer::from_writer(vec![]);
        let mut header = vec!["date".to_string()];
        header.extend(columns.iter().cloned());
        writer.write_record(&header)?;

        for (date, row) in &self.rows {
            let mut record = vec![date.format("%Y-%m-%d").to_string()];
            for symbol in &columns {
                match row.get(symbol) {
                    Some(cap) => record.push(format!("{cap:.6}")),
                    None => record.push(String::new()),
                }
            }
            writer.write_record(&record)?;
        }

        let data = writer
            .into_inner()
            .map_err(|e| StoreError::Malformed(format!("flush CSV writer: {e}")))?;

        let tmp_path = path.with_extension("csv.tmp");
        fs::write(&tmp_path, data)?;
        fs::rename(&tmp_path, path).map_err(|e| {
            let _ = fs::remove_file(&tmp_path);
            StoreError::Io(e)
        })?;

        Ok(())
    }

    /// True when history is too short to analyze and must be reconstructed.
    pub fn needs_backfill(&self) -> bool {
        self.rows.len() < BACKFILL_THRESHOLD
    }

    /// Insert a row, replacing any existing row for the same date.
    pub fn upsert(&mut self, date: NaiveDate, row: CapRow) {
        match self.rows.binary_search_by_key(&date, |(d, _)| *d) {
            Ok(i) => self.rows[i].1 = row,
            Err(i) => self.rows.insert(i, (date, row)),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[(NaiveDate, CapRow)] {
        &self.rows
    }

    /// The two most recent rows as (previous, latest).
    pub fn last_two(&self) -> Option<(&(NaiveDate, CapRow), &(NaiveDate, CapRow))> {
        let n = self.rows.len();
        if n < 2 {
            return None;
        }
        Some((&self.rows[n - 2], &self.rows[n - 1]))
    }

    /// Last `n` rows (fewer if history is shorter).
    pub fn trailing(&self, n: usize) -> &[(NaiveDate, CapRow)] {
        let start = self.rows.len().saturating_sub(n);
        &self.rows[start..]
    }

    /// The window of up to `n` rows ending one row before the latest, i.e.
    /// rows `[-(n+1)..-1]`. Clamped at the start of history, so a store of
    /// exactly `n` rows yields an `n - 1`-row prior window.
    pub fn prior_trailing(&self, n: usize) -> &[(NaiveDate, CapRow)] {
        let len = self.rows.len();
        if len < 2 {
            return &[];
        }
        let start = len.saturating_sub(n + 1);
        &self.rows[start..len - 1]
    }

    /// Union of all symbols ever present, sorted.
    pub fn symbols(&self) -> BTreeSet<String> {
        self.rows
            .iter()
            .flat_map(|(_, row)| row.keys().cloned())
            .collect()
    }
}

/// Combine closes and share counts into one day's cap row.
///
/// Caps are in billions (`price × shares / 1e9`). Symbols lacking either a
/// close or a positive share count are absent from the result.
pub fn cap_row(closes: &BTreeMap<String, f64>, shares: &BTreeMap<String, u64>) -> CapRow {
    let mut row = CapRow::new();
    for (symbol, count) in shares {
        if *count == 0 {
            continue;
        }
        if let Some(close) = closes.get(symbol) {
            row.insert(symbol.clone(), close * (*count as f64) / 1_000_000_000.0);
        }
    }
    row
}
