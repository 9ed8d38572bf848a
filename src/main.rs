//! Trend Exporter CLI
//!
//! Provides commands for:
//! - `accounts`: List the available accounts
//! - `export`: Export every account's daily balance history to CSV
//! - `trend`: Export a single trend report over a date range

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use trend_exporter::cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive("trend_exporter=info".parse()?))
        .init();

    // Load environment variables from .env file
    dotenv::dotenv().ok();

    // Parse CLI arguments
    let cli = Cli::parse();
    let config = cli.config.as_deref();

    // Execute command
    match cli.command {
        Commands::Accounts(args) => {
            trend_exporter::cli::accounts::execute(args, config).await?;
        }
        Commands::Export(args) => {
            trend_exporter::cli::export::execute(args, config).await?;
        }
        Commands::Trend(args) => {
            trend_exporter::cli::trend::execute(args, config).await?;
        }
    }

    Ok(())
}
