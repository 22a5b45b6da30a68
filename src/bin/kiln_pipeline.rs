//! kiln-pipeline: run the complete ELT pipeline
//! (extract → dbt transform → dbt docs).
//!
//! Usage:
//!   # Full pipeline
//!   kiln-pipeline
//!
//!   # Re-run only the dbt transformations over already-staged data
//!   kiln-pipeline --skip-extract
//!
//! Exits 0 when extract and transform (where not skipped) both succeed,
//! 1 otherwise. Docs generation failures never change the exit code.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use kiln::pipeline::{run_pipeline, PipelineConfig};

#[derive(Parser, Debug)]
#[command(name = "kiln-pipeline")]
#[command(about = "Run the Pokemon ELT pipeline", long_about = None)]
struct Args {
    /// Skip the extraction phase
    #[arg(long)]
    skip_extract: bool,

    /// Skip the dbt transformation phase
    #[arg(long)]
    skip_transform: bool,

    /// dbt project directory
    #[arg(long, default_value = "transform/pokemon_dbt")]
    project_dir: PathBuf,

    /// SQLite database file, forwarded to the extraction subprocess
    #[arg(long, default_value = "data/pokemon.db")]
    db: PathBuf,

    /// Item count forwarded to the extraction subprocess
    #[arg(long, default_value_t = 151)]
    limit: u32,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config = PipelineConfig {
        dbt_project_dir: args.project_dir,
        skip_extract: args.skip_extract,
        skip_transform: args.skip_transform,
        extract_bin: None,
        extract_args: vec![
            "--db".to_string(),
            args.db.display().to_string(),
            "--limit".to_string(),
            args.limit.to_string(),
        ],
    };

    let report = run_pipeline(&config)?;
    std::process::exit(if report.success { 0 } else { 1 });
}
