//! Run configuration — watchlist, macro indicator map, store path, secrets.
//!
//! Loads from a TOML file, with a compiled-in default matching the deployed
//! artifact. Delivery secrets may live in the file or come from the
//! `TELEGRAM_TOKEN` / `TELEGRAM_CHAT_ID` environment variables.

use anyhow::{Context, Result};
use capwatch_core::macroview::IndicatorSpec;
use capwatch_core::notify::{DisabledSink, MessageSink, TelegramSink};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Delivery credentials. Both must be present for real delivery; otherwise
/// the run downgrades to a logged no-op sink.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TelegramConfig {
    pub token: Option<String>,
    pub chat_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Where the market-cap history CSV lives.
    #[serde(default = "default_store_path")]
    pub store_path: PathBuf,

    /// Large-cap equities tracked by the ranking report.
    pub watchlist: Vec<String>,

    /// Macro indicators, in display order.
    pub macro_indicators: Vec<IndicatorSpec>,

    #[serde(default)]
    pub telegram: TelegramConfig,
}

fn default_store_path() -> PathBuf {
    PathBuf::from("data/market_cap_history.csv")
}

impl RunConfig {
    /// Load a configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("read config file {}", path.display()))?;
        Self::from_toml(&content)
    }

    /// Parse a configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).context("parse config TOML")
    }

    /// Fill missing delivery credentials from the environment.
    pub fn with_env_credentials(mut self) -> Self {
        if self.telegram.token.is_none() {
            self.telegram.token = std::env::var("TELEGRAM_TOKEN").ok();
        }
        if self.telegram.chat_id.is_none() {
            self.telegram.chat_id = std::env::var("TELEGRAM_CHAT_ID").ok();
        }
        self
    }

    /// Build the message sink: Telegram when both credentials are present
    /// and non-empty, otherwise the logged no-op stand-in.
    pub fn sink(&self) -> Box<dyn MessageSink> {
        match (&self.telegram.token, &self.telegram.chat_id) {
            (Some(token), Some(chat_id)) if !token.is_empty() && !chat_id.is_empty() => {
                Box::new(TelegramSink::new(token, chat_id))
            }
            _ => Box::new(DisabledSink),
        }
    }

    /// The deployed default: 12 macro indicators and a ~50-symbol US
    /// large-cap watchlist.
    pub fn default_us() -> Self {
        let indicators = [
            ("USD/KRW", "KRW=X"),
            ("JPY/KRW", "JPYKRW=X"),
            ("EUR/KRW", "EURKRW=X"),
            ("USD/CNY", "CNY=X"),
            ("Gold Futures", "GC=F"),
            ("WTI Crude", "CL=F"),
            ("S&P 500", "^GSPC"),
            ("Nasdaq", "^IXIC"),
            ("Nikkei 225", "^N225"),
            ("KOSPI", "^KS11"),
            ("KOSDAQ", "^KQ11"),
            ("US 10Y Treasury", "^TNX"),
        ];

        let watchlist = [
            "AAPL", "MSFT", "NVDA", "GOOG", "AMZN", "META", "TSLA", "BRK-A", "LLY", "AVGO",
            "JPM", "V", "ORCL", "WMT", "XOM", "MA", "NFLX", "JNJ", "COST", "ABBV", "PLTR",
            "BAC", "PG", "HD", "AMD", "KO", "GE", "CRM", "CSCO", "CVX", "UNH", "IBM", "WFC",
            "CAT", "MS", "AXP", "MRK", "PM", "TMUS", "MU", "GS", "RTX", "ABT", "TMO", "MCD",
            "PEP", "ISRG", "LIN", "SHOP",
        ];

        Self {
            store_path: default_store_path(),
            watchlist: watchlist.iter().map(|s| s.to_string()).collect(),
            macro_indicators: indicators
                .iter()
                .map(|(name, ticker)| IndicatorSpec {
                    name: name.to_string(),
                    ticker: ticker.to_string(),
                })
                .collect(),
            telegram: TelegramConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_shape() {
        let config = RunConfig::default_us();
        assert_eq!(config.macro_indicators.len(), 12);
        assert!(config.watchlist.len() >= 45);
        assert!(config.watchlist.contains(&"AAPL".to_string()));
        assert!(config
            .store_path
            .to_string_lossy()
            .ends_with("market_cap_history.csv"));
    }

    #[test]
    fn watchlist_has_no_duplicates() {
        let config = RunConfig::default_us();
        let unique: std::collections::BTreeSet<_> = config.watchlist.iter().collect();
        assert_eq!(unique.len(), config.watchlist.len());
    }

    #[test]
    fn toml_roundtrip() {
        let config = RunConfig::default_us();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed = RunConfig::from_toml(&toml_str).unwrap();
        assert_eq!(parsed.watchlist, config.watchlist);
        assert_eq!(parsed.macro_indicators.len(), 12);
    }

    #[test]
    fn parse_minimal_toml() {
        let toml_str = r#"
            watchlist = ["AAPL", "MSFT"]

            [[macro_indicators]]
            name = "Gold Futures"
            ticker = "GC=F"
        "#;
        let config = RunConfig::from_toml(toml_str).unwrap();
        assert_eq!(config.watchlist.len(), 2);
        assert_eq!(config.macro_indicators[0].ticker, "GC=F");
        // Defaults kick in for omitted sections.
        assert!(config.telegram.token.is_none());
        assert_eq!(config.store_path, default_store_path());
    }

    #[test]
    fn sink_without_credentials_is_disabled() {
        let config = RunConfig::default_us();
        assert_eq!(config.sink().name(), "disabled");
    }

    #[test]
    fn sink_with_credentials_is_telegram() {
        let mut config = RunConfig::default_us();
        config.telegram.token = Some("123:abc".into());
        config.telegram.chat_id = Some("-1001".into());
        assert_eq!(config.sink().name(), "telegram");
    }

    #[test]
    fn sink_with_empty_credentials_is_disabled() {
        let mut config = RunConfig::default_us();
        config.telegram.token = Some(String::new());
        config.telegram.chat_id = Some("-1001".into());
        assert_eq!(config.sink().name(), "disabled");
    }
}
