//! kiln-extract: full-refresh extraction of PokeAPI data into SQLite
//! staging tables.
//!
//! Usage:
//!   # Default: first 151 pokemon, 100ms between requests
//!   kiln-extract
//!
//!   # Small test run against a local database file
//!   kiln-extract --db /tmp/pokemon.db --limit 10 --delay-ms 50

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;

use kiln::api::{ApiClient, DEFAULT_BASE_URL};
use kiln::extract::{run_extraction, ExtractConfig};
use kiln::store::RawStore;

#[derive(Parser, Debug)]
#[command(name = "kiln-extract")]
#[command(about = "Extract PokeAPI data into raw SQLite staging tables", long_about = None)]
struct Args {
    /// SQLite database file holding the staging tables
    #[arg(long, default_value = "data/pokemon.db")]
    db: PathBuf,

    /// Number of pokemon requested from the index endpoint
    #[arg(long, default_value_t = 151)]
    limit: u32,

    /// Pause between consecutive API requests, in milliseconds
    #[arg(long, default_value_t = 100)]
    delay_ms: u64,

    /// API root URL
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    base_url: String,
}

fn main() -> Result<()> {
    let args = Args::parse();

    if let Some(parent) = args.db.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    println!("{}", "=".repeat(60));
    println!("Pokemon ELT - Extract Phase");
    println!("{}\n", "=".repeat(60));

    let client = ApiClient::new();
    let store = RawStore::open(&args.db)?;
    let config = ExtractConfig {
        base_url: args.base_url,
        limit: args.limit,
        delay: Duration::from_millis(args.delay_ms),
    };

    let report = run_extraction(&client, &store, &config)?;

    println!("\n{}", "=".repeat(60));
    println!("Extraction Summary");
    println!("{}", "=".repeat(60));
    println!("Pokemon:    {:>6}", report.counts.pokemon);
    println!("Types:      {:>6}", report.counts.types);
    println!("Abilities:  {:>6}", report.counts.abilities);
    println!("Stats:      {:>6}", report.counts.stats);
    println!("{}", "=".repeat(60));

    if report.failures.is_empty() {
        println!("\n✓ Loaded {} of {} pokemon", report.loaded, report.attempted);
    } else {
        println!(
            "\n⚠ Loaded {} of {} pokemon ({} failed)",
            report.loaded,
            report.attempted,
            report.failures.len()
        );
    }

    Ok(())
}
