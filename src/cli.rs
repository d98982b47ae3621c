//! Command-line surface (spec.md §6). A single flat `Args` struct — this
//! tool does one thing, so there is no subcommand tree the way the rest of
//! this lineage uses one.

use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;

use clap::Parser;
use tracing::info;

use crate::config::AppConfig;
use crate::decoder::address::Network;
use crate::driver::{self, Column, ColumnSet};
use crate::errors::AppResult;
use crate::store::LevelDbStore;
use crate::utils::currency::format_sats_as_btc;

/// Decode a Bitcoin-derived full node's chainstate database into a CSV
/// dump of unspent transaction outputs.
#[derive(Parser)]
#[command(name = "chainstate-dump")]
#[command(about = "Decode a Bitcoin chainstate database into a CSV UTXO dump")]
#[command(version)]
pub struct Cli {
    /// Path to the chainstate LevelDB directory
    #[arg(long = "db")]
    db: PathBuf,

    /// Output CSV path (defaults to stdout when omitted)
    #[arg(long = "o")]
    output: Option<PathBuf>,

    /// Comma-separated output columns (default: the full column set)
    #[arg(long = "f")]
    fields: Option<String>,

    /// Force testnet address prefixes, overriding path auto-detection
    #[arg(long)]
    testnet: bool,

    /// Echo every CSV line to stdout as it is written
    #[arg(long)]
    v: bool,
}

pub fn run() -> AppResult<()> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .try_init();

    let cli = Cli::parse();
    let app_config = AppConfig::load().unwrap_or_else(|e| {
        tracing::warn!("failed to load config.toml, using defaults: {}", e);
        AppConfig {
            processing: crate::config::ProcessingConfig::default(),
        }
    });

    let columns = match &cli.fields {
        Some(spec) => ColumnSet::parse(spec)?,
        None => ColumnSet::default_all(),
    };

    let network = resolve_network(&cli.db, cli.testnet);
    info!(db = %cli.db.display(), network = ?network, "opening chainstate");

    let mut store = LevelDbStore::open(&cli.db)?;

    let mut sink: Box<dyn Write> = match &cli.output {
        Some(path) => Box::new(File::create(path)?),
        None => Box::new(io::stdout()),
    };

    let stats = driver::run(
        &mut store,
        &columns,
        network,
        &mut sink,
        cli.v,
        app_config.processing.progress_interval_records,
    )?;

    print_summary(&stats, &columns);
    Ok(())
}

/// Explicit `--testnet` wins unconditionally; otherwise fall back to a
/// substring check on the db path (spec.md §9).
fn resolve_network(db: &PathBuf, explicit_testnet: bool) -> Network {
    if explicit_testnet || db.to_string_lossy().contains("testnet") {
        Network::Testnet
    } else {
        Network::Mainnet
    }
}

fn print_summary(stats: &driver::DumpStats, columns: &ColumnSet) {
    println!("\n=== chainstate-dump complete ===");
    println!("Total UTXOs: {}", stats.total_utxos);

    if columns.contains(Column::Amount) {
        if let Some(total) = stats.total_satoshis {
            println!("Total value: {}", format_sats_as_btc(total));
        }
    }

    if columns.contains(Column::Type) {
        if let Some(per_class) = &stats.per_class {
            let mut classes: Vec<_> = per_class.iter().collect();
            classes.sort_by_key(|(name, _)| *name);
            for (class, count) in classes {
                println!("  {class}: {count}");
            }
        }
    }
}
