//! Prospector CLI: find and rank B2B prospects against an Ideal Customer Profile.
//!
//! Pulls companies from the configured data sources (or deterministic mock
//! data), scores them against an ICP file, and writes JSON/CSV exports.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
