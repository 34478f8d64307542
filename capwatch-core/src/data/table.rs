//! Date-keyed table of closing prices across symbols.
//!
//! Rows are sparse: a symbol with no trade on a date is absent, not zero.
//! Forward-fill exists for the macro indicator path only — market-cap
//! computation must never see carried-forward closes.

use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet};

/// Mapping date → (symbol → close), ordered by date ascending.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceTable {
    rows: BTreeMap<NaiveDate, BTreeMap<String, f64>>,
}

impl PriceTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, date: NaiveDate, symbol: &str, close: f64) {
        self.rows
            .entry(date)
            .or_default()
            .insert(symbol.to_string(), close);
    }

    /// Merge a single symbol's dated close series into the table.
    pub fn merge_series(&mut self, symbol: &str, series: &[(NaiveDate, f64)]) {
        for (date, close) in series {
            self.insert(*date, symbol, *close);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of dates in the table.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn rows(&self) -> impl Iterator<Item = (&NaiveDate, &BTreeMap<String, f64>)> {
        self.rows.iter()
    }

    pub fn row(&self, date: &NaiveDate) -> Option<&BTreeMap<String, f64>> {
        self.rows.get(date)
    }

    /// Latest row (by date), if any.
    pub fn latest(&self) -> Option<(&NaiveDate, &BTreeMap<String, f64>)> {
        self.rows.iter().next_back()
    }

    /// The two most recent rows as (previous, latest).
    pub fn last_two(
        &self,
    ) -> Option<(
        (&NaiveDate, &BTreeMap<String, f64>),
        (&NaiveDate, &BTreeMap<String, f64>),
    )> {
        let mut iter = self.rows.iter().rev();
        let latest = iter.next()?;
        let prev = iter.next()?;
        Some((prev, latest))
    }

    /// Union of all symbols present anywhere in the table.
    pub fn symbols(&self) -> BTreeSet<String> {
        self.rows
            .values()
            .flat_map(|row| row.keys().cloned())
            .collect()
    }

    /// Carry each symbol's last seen close forward into later rows that
    /// lack it. Leading gaps (before a symbol's first close) stay absent.
    pub fn forward_fill(&mut self) {
        let symbols = self.symbols();
        let mut carry: BTreeMap<&str, f64> = BTreeMap::new();

        for row in self.rows.values_mut() {
            for symbol in &symbols {
                match row.get(symbol.as_str()) {
                    Some(close) => {
                        carry.insert(symbol, *close);
                    }
                    None => {
                        if let Some(close) = carry.get(symbol.as_str()) {
                            row.insert(symbol.clone(), *close);
                        }
                    }
                }
            }
        }
    }
}
