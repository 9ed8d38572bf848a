//! Trend command - single report export over a date range

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use chrono::NaiveDate;
use clap::Args;
use tracing::info;

use crate::export::trend_csv;
use crate::model::{ReportKind, TrendSelection};
use crate::orchestrator::TrendExporter;
use crate::progress::{ProgressCallback, ProgressEvent};

/// Arguments for the trend command
#[derive(Args)]
pub struct TrendArgs {
    /// Report kind (assets, debts, income, spending, net-income, net-worth)
    #[arg(long, short)]
    pub report: ReportKind,

    /// Start date (YYYY-MM-DD)
    #[arg(long)]
    pub from: NaiveDate,

    /// End date (YYYY-MM-DD)
    #[arg(long)]
    pub to: NaiveDate,

    /// Account ids to exclude (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub exclude: Vec<String>,

    /// Output file (stdout when omitted)
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

/// Execute the trend command
pub async fn execute(args: TrendArgs, config: Option<&std::path::Path>) -> Result<()> {
    let settings = super::load_settings(config)?;
    let (provider, executor) = super::build_stack(&settings)?;
    let exporter = TrendExporter::new(provider, executor, settings.fetch.clone());

    let selection = TrendSelection {
        report_kind: args.report,
        deselected_account_ids: args.exclude.clone(),
        from_date: args.from,
        to_date: args.to,
    };

    let observer: ProgressCallback = Arc::new(|event| {
        if let ProgressEvent::Trend {
            complete_percentage,
        } = event
        {
            info!("Trend export {:>5.1}%", complete_percentage * 100.0);
        }
    });

    let entries = exporter.export(&selection, Some(observer)).await?;
    info!("Fetched {} entries", entries.len());

    let csv = trend_csv(&entries, args.report)?;
    super::write_output(&csv, args.output.as_deref())
}
