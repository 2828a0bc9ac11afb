//! `catalog-history` CLI: record catalog snapshots and summarize item
//! availability history.
//!
//! ## Usage
//!
//! ```sh
//! # Store a catalog listing (stdin) as a new snapshot, if it changed
//! curl -s "$CATALOG_URL" | catalog-history record
//!
//! # Reconstruct every item's history as JSON
//! catalog-history summarize -o data/summary.json
//!
//! # Use other inputs than the configured ones
//! catalog-history summarize --snapshots ./snaps --historical ./old.json
//!
//! # Counts of available / removed / returning items
//! catalog-history stats
//! ```
//!
//! Settings come from `catalog-history.toml` (or `--config FILE`) and
//! `CATALOG_HISTORY_*` environment variables; see [`config::Settings`].
//! Logs go to stderr; set `RUST_LOG` or pass `--verbose` for more detail.

mod config;
mod store;

use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use catalog_history::{
    project, reconcile, seed_summary, HistoricalRecord, ItemHistory, Summary,
};
use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::config::Settings;

#[derive(Parser)]
#[command(
    name = "catalog-history",
    version,
    about = "Reconstruct catalog item availability history from snapshots"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (TOML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Where the history is rebuilt from.
#[derive(Args)]
struct Sources {
    /// Snapshot directory (overrides `snapshots_dir`)
    #[arg(long)]
    snapshots: Option<PathBuf>,
    /// Historical record list; repeat for several (overrides `historical`)
    #[arg(long, conflicts_with = "no_historical")]
    historical: Vec<PathBuf>,
    /// Start from an empty summary instead of historical records
    #[arg(long)]
    no_historical: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Rebuild every item's availability history and print it as JSON
    Summarize {
        #[command(flatten)]
        sources: Sources,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Store a catalog listing as a new snapshot unless it is unchanged
    Record {
        /// Input file holding a JSON array (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<PathBuf>,
        /// Snapshot directory (overrides `snapshots_dir`)
        #[arg(long)]
        snapshots: Option<PathBuf>,
    },
    /// Show item counts of the rebuilt history
    Stats {
        #[command(flatten)]
        sources: Sources,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(default_level.into())
                .from_env_lossy(),
        )
        .with_writer(io::stderr)
        .init();

    let settings = Settings::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Summarize { sources, output } => {
            let history = build_history(&settings, &sources).await?;
            let json = serde_json::to_string_pretty(&history)
                .context("Failed to serialise history")?;
            write_output(output.as_deref(), &json)?;
        }
        Commands::Record { input, snapshots } => {
            let text = read_input(input.as_deref())?;
            let listing: serde_json::Value =
                serde_json::from_str(&text).context("Catalog listing is not valid JSON")?;
            let root = snapshots.unwrap_or(settings.snapshots_dir);
            if let Some(path) = store::record_listing(&root, Utc::now(), &listing)? {
                println!("{}", path.display());
            }
        }
        Commands::Stats { sources } => {
            let history = build_history(&settings, &sources).await?;
            let available = history.iter().filter(|item| item.is_available()).count();
            let gapped = history.iter().filter(|item| item.has_gaps()).count();
            println!("Items:      {}", history.len());
            println!("Available:  {}", available);
            println!("Removed:    {}", history.len() - available);
            println!("With gaps:  {}", gapped);
        }
    }

    Ok(())
}

/// Seed from historical records and load snapshots concurrently, then fold
/// the snapshots in timestamp order.
async fn build_history(settings: &Settings, sources: &Sources) -> Result<Vec<ItemHistory>> {
    let snapshots_dir = sources
        .snapshots
        .clone()
        .unwrap_or_else(|| settings.snapshots_dir.clone());
    let historical = if sources.no_historical {
        Vec::new()
    } else if sources.historical.is_empty() {
        settings.historical.clone()
    } else {
        sources.historical.clone()
    };

    let (seed, snapshots) = tokio::try_join!(
        load_seed(&historical, settings.cutover),
        store::load_snapshots(&snapshots_dir),
    )?;
    info!(
        seeded = seed.len(),
        snapshots = snapshots.len(),
        "reconciling snapshots"
    );

    let summary = reconcile(seed, &snapshots).context("Failed to reconcile snapshots")?;
    Ok(project(&summary))
}

async fn load_seed(paths: &[PathBuf], cutover: DateTime<Utc>) -> Result<Summary> {
    let mut records: Vec<HistoricalRecord> = Vec::new();
    for path in paths {
        let text = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read historical records: {}", path.display()))?;
        let mut list: Vec<HistoricalRecord> = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse historical records: {}", path.display()))?;
        records.append(&mut list);
    }
    seed_summary(&records, cutover).context("Failed to seed from historical records")
}

fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read file: {}", path.display())),
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            Ok(buf)
        }
    }
}

fn write_output(path: Option<&Path>, content: &str) -> Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write file: {}", path.display()))?;
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
