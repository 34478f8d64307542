//! CapWatch CLI — scheduled market-data notifier.
//!
//! Commands:
//! - `run` — fetch, analyze, and deliver both reports (the cron entry point)
//! - `preview` — build both reports and print them instead of sending
//! - `backfill` — rebuild the trailing month of market-cap history
//! - `status` — report store location, row count, and date range

use anyhow::Result;
use capwatch_core::data::YahooProvider;
use capwatch_core::notify::{MessageSink, NotifyError};
use capwatch_core::store::backfill::backfill;
use capwatch_core::store::CapHistory;
use capwatch_runner::pipeline::run_once;
use capwatch_runner::RunConfig;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "capwatch", about = "CapWatch — market-cap ranking notifier")]
struct Cli {
    /// Path to a TOML config file. Defaults to the built-in US config.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch, analyze, and deliver both reports.
    Run,
    /// Build both reports and print them to stdout instead of sending.
    Preview,
    /// Rebuild the trailing month of market-cap history unconditionally.
    Backfill,
    /// Print store location, row count, and date range.
    Status,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;
    let today = chrono::Local::now().date_naive();

    match cli.command {
        Commands::Run => run_cmd(&config, today),
        Commands::Preview => preview_cmd(&config, today),
        Commands::Backfill => backfill_cmd(&config, today),
        Commands::Status => status_cmd(&config),
    }
}

fn load_config(path: Option<&Path>) -> Result<RunConfig> {
    let config = match path {
        Some(path) => RunConfig::from_file(path)?,
        None => RunConfig::default_us(),
    };
    Ok(config.with_env_credentials())
}

/// The scheduled entry point. Exits 0 even when stages or delivery fail —
/// partial failures are already folded into the outgoing messages.
fn run_cmd(config: &RunConfig, today: NaiveDate) -> Result<()> {
    let provider = YahooProvider::new();
    let sink = config.sink();

    let summary = run_once(&provider, sink.as_ref(), config, today);

    println!(
        "macro report:      {}",
        delivery_label(summary.macro_delivered)
    );
    println!(
        "market-cap report: {}",
        delivery_label(summary.mcap_delivered)
    );

    Ok(())
}

fn delivery_label(delivered: bool) -> &'static str {
    if delivered {
        "delivered"
    } else {
        "NOT delivered (see log)"
    }
}

/// Sink that prints instead of sending, for `preview`.
struct StdoutSink;

impl MessageSink for StdoutSink {
    fn name(&self) -> &str {
        "stdout"
    }

    fn send(&self, text: &str) -> Result<(), NotifyError> {
        println!("{}", "-".repeat(40));
        println!("{text}");
        Ok(())
    }
}

fn preview_cmd(config: &RunConfig, today: NaiveDate) -> Result<()> {
    let provider = YahooProvider::new();
    run_once(&provider, &StdoutSink, config, today);
    Ok(())
}

fn backfill_cmd(config: &RunConfig, today: NaiveDate) -> Result<()> {
    let provider = YahooProvider::new();

    println!(
        "Rebuilding history for {} symbols (one metadata request each)...",
        config.watchlist.len()
    );
    let (history, report) = backfill(&provider, &config.watchlist, today);
    history.save(&config.store_path)?;

    println!("Rebuilt {} rows: {}", report.rows, config.store_path.display());
    for skipped in report
        .skipped_shares
        .iter()
        .chain(report.skipped_prices.iter())
    {
        println!("  skipped {}: {}", skipped.symbol, skipped.reason);
    }

    Ok(())
}

fn status_cmd(config: &RunConfig) -> Result<()> {
    let history = CapHistory::load(&config.store_path)?;

    println!("Store:   {}", config.store_path.display());
    println!("Rows:    {}", history.len());

    if let (Some((first, _)), Some((last, _))) =
        (history.rows().first(), history.rows().last())
    {
        println!("Range:   {first} to {last}");
    }
    println!("Symbols: {}", history.symbols().len());

    if history.needs_backfill() {
        println!();
        println!("History is below the analysis threshold — run `capwatch backfill`.");
    }

    Ok(())
}
