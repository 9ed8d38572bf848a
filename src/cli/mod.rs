//! Command-line interface
//!
//! Provides CLI commands for the trend exporter.

pub mod accounts;
pub mod export;
pub mod trend;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::config::Settings;
use crate::fetch::{FetchExecutor, RequestRateLimiter, RetryPolicy};
use crate::provider::HttpTrendProvider;

/// Trend Exporter CLI
#[derive(Parser)]
#[command(name = "trend-exporter")]
#[command(about = "Export daily balance histories and trend reports to CSV")]
#[command(version)]
pub struct Cli {
    /// Path to a configuration file
    #[arg(long, short, global = true)]
    pub config: Option<PathBuf>,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// List the available accounts
    Accounts(accounts::AccountsArgs),
    /// Export every account's daily balance history
    Export(export::ExportArgs),
    /// Export a single trend report over a date range
    Trend(trend::TrendArgs),
}

/// Load settings, honoring an explicit config file path.
pub(crate) fn load_settings(path: Option<&Path>) -> Result<Settings> {
    Settings::load(path).context("failed to load configuration")
}

/// Build the shared provider and executor from settings.
pub(crate) fn build_stack(settings: &Settings) -> Result<(Arc<HttpTrendProvider>, FetchExecutor)> {
    let provider = Arc::new(HttpTrendProvider::new(&settings.api)?);
    let limiter = Arc::new(RequestRateLimiter::from_settings(&settings.rate_limit));
    let executor = FetchExecutor::new(limiter, RetryPolicy::from_settings(&settings.fetch));
    Ok((provider, executor))
}

/// Write CSV output to the given path, or stdout when none is given.
pub(crate) fn write_output(csv: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, csv)
                .with_context(|| format!("failed to write {}", path.display()))?;
            tracing::info!("Wrote {}", path.display());
        }
        None => print!("{csv}"),
    }
    Ok(())
}
