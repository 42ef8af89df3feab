// flightdash - main.rs
// Loads configuration, initialises tracing, then hands off to the CLI.

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use flightdash::cli::{dispatch, Cli};
use flightdash::config_loader::load_config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref()).context("Failed to load config")?;

    // RUST_LOG overrides the configured filter
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.filter))
        .context("Invalid logging filter")?;
    tracing_subscriber::fmt().with_env_filter(filter).init();

    dispatch(cli.command, config).await
}
