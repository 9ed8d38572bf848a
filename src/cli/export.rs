//! Export command - full multi-account balance history to CSV

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Args;
use tracing::info;

use crate::export::history_csv;
use crate::orchestrator::HistoryExporter;
use crate::progress::{ProgressCallback, ProgressEvent};

/// Arguments for the export command
#[derive(Args)]
pub struct ExportArgs {
    /// Output file (stdout when omitted)
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// Restrict the export to these account ids (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub accounts: Vec<String>,
}

/// Execute the export command
pub async fn execute(args: ExportArgs, config: Option<&std::path::Path>) -> Result<()> {
    let settings = super::load_settings(config)?;
    let (provider, executor) = super::build_stack(&settings)?;
    let exporter = HistoryExporter::new(provider, executor, settings.fetch.clone());

    let mut accounts = exporter.list_accounts().await?;
    if !args.accounts.is_empty() {
        accounts.retain(|a| args.accounts.contains(&a.id));
    }
    info!("Exporting {} accounts", accounts.len());

    let observer: ProgressCallback = Arc::new(|event| {
        if let ProgressEvent::History {
            completed_accounts,
            total_accounts,
            complete_percentage,
        } = event
        {
            info!(
                "History export {:>5.1}% ({}/{} accounts)",
                complete_percentage * 100.0,
                completed_accounts,
                total_accounts
            );
        }
    });

    let histories = exporter.export_all(&accounts, Some(observer)).await?;
    let csv = history_csv(&histories)?;
    super::write_output(&csv, args.output.as_deref())
}
