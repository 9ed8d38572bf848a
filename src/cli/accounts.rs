//! Accounts command - list the available accounts

use anyhow::Result;
use clap::Args;
use tracing::info;

use crate::orchestrator::HistoryExporter;

/// Arguments for the accounts command
#[derive(Args)]
pub struct AccountsArgs {}

/// Execute the accounts command
pub async fn execute(args: AccountsArgs, config: Option<&std::path::Path>) -> Result<()> {
    let AccountsArgs {} = args;

    let settings = super::load_settings(config)?;
    let (provider, executor) = super::build_stack(&settings)?;
    let exporter = HistoryExporter::new(provider, executor, settings.fetch.clone());

    let accounts = exporter.list_accounts().await?;
    info!("Found {} accounts", accounts.len());

    for account in &accounts {
        println!("{}\t{}\t{}", account.id, account.kind, account.name);
    }
    Ok(())
}
