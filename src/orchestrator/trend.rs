//! Single-report trend orchestration.
//!
//! Unlike the per-account history export, a trend export runs one report
//! kind over an explicit date range, optionally excluding accounts. The
//! range is clamped to today, split into rate-limit-sized windows, and
//! fetched through the shared executor.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use tracing::{info, warn};

use crate::config::FetchSettings;
use crate::error::{ExportError, ExportResult};
use crate::fetch::{FetchExecutor, UnitCallback};
use crate::model::{BalanceEntry, TrendFilter, TrendSelection};
use crate::progress::{ProgressCallback, ProgressTracker};
use crate::provider::{ProviderError, TrendProvider};
use crate::windows::split_range;

/// Runs one report-kind export over a caller-supplied date range.
pub struct TrendExporter<P> {
    provider: Arc<P>,
    executor: FetchExecutor,
    fetch: FetchSettings,
}

impl<P: TrendProvider + 'static> TrendExporter<P> {
    pub fn new(provider: Arc<P>, executor: FetchExecutor, fetch: FetchSettings) -> Self {
        Self {
            provider,
            executor,
            fetch,
        }
    }

    /// Fetch the selected report's entries in date order.
    pub async fn export(
        &self,
        selection: &TrendSelection,
        on_progress: Option<ProgressCallback>,
    ) -> ExportResult<Vec<BalanceEntry>> {
        let today = Utc::now().date_naive();
        self.export_as_of(selection, today, on_progress).await
    }

    /// `export` with an explicit "today", for deterministic tests.
    pub async fn export_as_of(
        &self,
        selection: &TrendSelection,
        today: NaiveDate,
        on_progress: Option<ProgressCallback>,
    ) -> ExportResult<Vec<BalanceEntry>> {
        if selection.from_date > selection.to_date {
            return Err(ExportError::Configuration(format!(
                "from date {} is after to date {}",
                selection.from_date, selection.to_date
            )));
        }

        // Future end dates are clamped rather than rejected.
        let end = selection.to_date.min(today);
        if selection.from_date > end {
            return Err(ExportError::Configuration(format!(
                "date range {}..{} lies entirely in the future",
                selection.from_date, selection.to_date
            )));
        }

        let windows = split_range(selection.from_date, end, self.fetch.max_window_days);
        info!(
            "Exporting {} report over {} windows ({} to {})",
            selection.report_kind,
            windows.len(),
            selection.from_date,
            end
        );

        let tracker = Arc::new(ProgressTracker::new(windows.len(), 1));
        let tasks: Vec<_> = windows
            .iter()
            .map(|window| {
                let provider = self.provider.clone();
                let filter = TrendFilter::excluding(selection.deselected_account_ids.clone());
                let kind = selection.report_kind;
                let window = *window;
                let limit = self.fetch.page_limit;
                move || {
                    let provider = provider.clone();
                    let filter = filter.clone();
                    async move {
                        match provider.fetch_trends(kind, &filter, &window, 0, limit).await? {
                            Some(entries) => Ok(entries),
                            None => Err(ProviderError::TrendTimeout),
                        }
                    }
                }
            })
            .collect();

        let unit_cb: UnitCallback = {
            let tracker = tracker.clone();
            let observer = on_progress.clone();
            Arc::new(move |_done, _total| {
                tracker.unit_completed_with(|snapshot| {
                    if let Some(observer) = &observer {
                        observer(snapshot.trend_event());
                    }
                });
            })
        };

        let results = self.executor.run_all(tasks, Some(unit_cb)).await;

        let mut entries = Vec::new();
        for (window, result) in windows.iter().zip(results) {
            match result {
                Ok(mut window_entries) => entries.append(&mut window_entries),
                Err(err) => {
                    warn!(
                        "Window {}..{} failed for {} report, leaving gap: {}",
                        window.start, window.end, selection.report_kind, err
                    );
                }
            }
        }
        Ok(entries)
    }
}
