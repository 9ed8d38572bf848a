//! Multi-account history orchestration.
//!
//! Accounts are processed strictly one at a time so the shared rate limiter
//! is never oversubscribed; only the windows of the in-flight account are
//! concurrently queued against it. A first pass probes every account's
//! monthly history to resolve its report kind and window count, which fixes
//! the global unit total before any daily fetch begins.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use tracing::{info, warn};

use crate::config::FetchSettings;
use crate::error::{ExportError, ExportResult};
use crate::fetch::{FetchExecutor, UnitCallback};
use crate::model::{Account, BalanceEntry, ReportKind, TrendFilter};
use crate::progress::{ProgressCallback, ProgressTracker};
use crate::provider::{ProviderError, TrendProvider};
use crate::windows::{resolve_windows, Window};

/// One account's contribution to the export.
#[derive(Debug, Clone)]
pub struct AccountHistory {
    pub account: Account,
    /// Resolved kind, `None` when the account contributed an empty slot.
    pub report_kind: Option<ReportKind>,
    pub entries: Vec<BalanceEntry>,
}

/// Per-account fetch plan resolved by the probe pass.
enum AccountPlan {
    Fetch {
        kind: ReportKind,
        windows: Vec<Window>,
    },
    /// No usable history; the account contributes an empty result.
    Empty,
}

impl AccountPlan {
    fn unit_count(&self) -> usize {
        match self {
            AccountPlan::Fetch { windows, .. } => windows.len(),
            AccountPlan::Empty => 0,
        }
    }
}

/// Orchestrates the full multi-account balance history export.
pub struct HistoryExporter<P> {
    provider: Arc<P>,
    executor: FetchExecutor,
    fetch: FetchSettings,
}

impl<P: TrendProvider + 'static> HistoryExporter<P> {
    pub fn new(provider: Arc<P>, executor: FetchExecutor, fetch: FetchSettings) -> Self {
        Self {
            provider,
            executor,
            fetch,
        }
    }

    /// List every account, assuming one page at the configured limit.
    pub async fn list_accounts(&self) -> ExportResult<Vec<Account>> {
        let provider = self.provider.clone();
        let limit = self.fetch.page_limit;
        let accounts = self
            .executor
            .run_one(|| {
                let provider = provider.clone();
                async move { provider.fetch_accounts(0, limit).await }
            })
            .await?;
        Ok(accounts)
    }

    /// Export daily balance history for every given account.
    ///
    /// Progress events are emitted per finished window and per finished
    /// account; the percentage is strictly non-decreasing and reaches 1.0
    /// at the final unit.
    pub async fn export_all(
        &self,
        accounts: &[Account],
        on_progress: Option<ProgressCallback>,
    ) -> ExportResult<Vec<AccountHistory>> {
        let today = Utc::now().date_naive();
        self.export_all_as_of(accounts, today, on_progress).await
    }

    /// `export_all` with an explicit "today", for deterministic tests.
    pub async fn export_all_as_of(
        &self,
        accounts: &[Account],
        today: NaiveDate,
        on_progress: Option<ProgressCallback>,
    ) -> ExportResult<Vec<AccountHistory>> {
        // First pass: probe monthly history and resolve windows for every
        // account, so the global unit total is known up front.
        let mut plans = Vec::with_capacity(accounts.len());
        for account in accounts {
            plans.push(self.plan_account(account, today).await?);
        }

        let total_units: usize = plans.iter().map(AccountPlan::unit_count).sum();
        let tracker = Arc::new(ProgressTracker::new(total_units, accounts.len()));
        info!(
            "Exporting {} accounts over {} windows",
            accounts.len(),
            total_units
        );

        let mut histories = Vec::with_capacity(accounts.len());
        for (account, plan) in accounts.iter().zip(plans) {
            let history = match plan {
                AccountPlan::Empty => AccountHistory {
                    account: account.clone(),
                    report_kind: None,
                    entries: Vec::new(),
                },
                AccountPlan::Fetch { kind, windows } => {
                    let entries = self
                        .fetch_account_windows(account, kind, &windows, &tracker, &on_progress)
                        .await;
                    AccountHistory {
                        account: account.clone(),
                        report_kind: Some(kind),
                        entries,
                    }
                }
            };

            let snapshot = tracker.account_completed();
            if let Some(observer) = &on_progress {
                observer(snapshot.history_event());
            }
            histories.push(history);
        }

        Ok(histories)
    }

    /// Probe one account's monthly history and resolve its windows.
    ///
    /// Unresolvable report kinds are structural and abort the run; missing
    /// history and probe failures degrade to an empty plan.
    async fn plan_account(&self, account: &Account, today: NaiveDate) -> ExportResult<AccountPlan> {
        let monthly = match self.probe_report_kind(account, today).await {
            Ok(probe) => probe,
            Err(err @ ExportError::ReportKindUnresolved { .. }) => return Err(err),
            Err(err) => {
                warn!(
                    "Probe failed for account '{}', contributing empty result: {}",
                    account.name, err
                );
                return Ok(AccountPlan::Empty);
            }
        };

        let (kind, history) = monthly;
        match resolve_windows(&history, self.fetch.max_window_days, today) {
            Ok(windows) => Ok(AccountPlan::Fetch { kind, windows }),
            Err(ExportError::NoHistory) => {
                warn!(
                    "Account '{}' has no history, contributing empty result",
                    account.name
                );
                Ok(AccountPlan::Empty)
            }
            Err(err) => Err(err),
        }
    }

    /// Try ASSETS then DEBTS for one account; exactly one must answer.
    async fn probe_report_kind(
        &self,
        account: &Account,
        today: NaiveDate,
    ) -> ExportResult<(ReportKind, Vec<BalanceEntry>)> {
        let window = probe_window(today);
        let assets = self
            .probe_kind(account, ReportKind::AssetsTime, &window)
            .await?;
        let debts = self
            .probe_kind(account, ReportKind::DebtsTime, &window)
            .await?;

        match (assets, debts) {
            (Some(history), None) => Ok((ReportKind::AssetsTime, history)),
            (None, Some(history)) => Ok((ReportKind::DebtsTime, history)),
            (Some(_), Some(_)) => Err(ExportError::ReportKindUnresolved {
                account: account.name.clone(),
                reason: "both ASSETS and DEBTS returned data".to_string(),
            }),
            (None, None) => Err(ExportError::ReportKindUnresolved {
                account: account.name.clone(),
                reason: "neither ASSETS nor DEBTS returned data".to_string(),
            }),
        }
    }

    /// One probe request. An absent payload is a meaningful answer here
    /// ("kind does not apply"), so only transport failures are retried.
    async fn probe_kind(
        &self,
        account: &Account,
        kind: ReportKind,
        window: &Window,
    ) -> ExportResult<Option<Vec<BalanceEntry>>> {
        let provider = self.provider.clone();
        let filter = TrendFilter::account(account.id.clone());
        let limit = self.fetch.page_limit;
        let window = *window;

        let result = self
            .executor
            .run_one(|| {
                let provider = provider.clone();
                let filter = filter.clone();
                async move { provider.fetch_trends(kind, &filter, &window, 0, limit).await }
            })
            .await?;
        Ok(result)
    }

    /// Fetch all daily windows of one account through the executor.
    ///
    /// Window failures that outlive the retry budget degrade to empty
    /// contributions; their units still count toward progress.
    async fn fetch_account_windows(
        &self,
        account: &Account,
        kind: ReportKind,
        windows: &[Window],
        tracker: &Arc<ProgressTracker>,
        on_progress: &Option<ProgressCallback>,
    ) -> Vec<BalanceEntry> {
        let tasks: Vec<_> = windows
            .iter()
            .map(|window| {
                let provider = self.provider.clone();
                let filter = TrendFilter::account(account.id.clone());
                let window = *window;
                let limit = self.fetch.page_limit;
                move || {
                    let provider = provider.clone();
                    let filter = filter.clone();
                    async move {
                        match provider.fetch_trends(kind, &filter, &window, 0, limit).await? {
                            Some(entries) => Ok(entries),
                            // Empty payload where data was expected: the
                            // request timed out upstream.
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
                        observer(snapshot.history_event());
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
                        "Window {}..{} failed for account '{}', leaving gap: {}",
                        window.start, window.end, account.name, err
                    );
                }
            }
        }
        entries
    }
}

/// The probe asks for the account's whole lifetime of monthly balances.
fn probe_window(today: NaiveDate) -> Window {
    let start = NaiveDate::from_ymd_opt(1970, 1, 1).expect("valid date");
    Window::new(start, today.max(start))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RateLimitSettings;
    use crate::fetch::{RequestRateLimiter, RetryPolicy};
    use crate::model::{AccountKind, TrendType};
    use crate::progress::ProgressEvent;
    use crate::provider::MockTrendProvider;
    use parking_lot::Mutex;
    use std::time::Duration;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn account(id: &str, name: &str) -> Account {
        Account {
            id: id.to_string(),
            name: name.to_string(),
            kind: AccountKind::Bank,
        }
    }

    fn monthly_asset(points: &[(&str, f64)]) -> Vec<BalanceEntry> {
        points
            .iter()
            .map(|(d, a)| BalanceEntry::from_reported(*a, date(d), TrendType::Asset))
            .collect()
    }

    fn exporter(provider: MockTrendProvider) -> HistoryExporter<MockTrendProvider> {
        let limiter = Arc::new(RequestRateLimiter::from_settings(&RateLimitSettings {
            requests_per_minute: 0,
        }));
        let executor =
            FetchExecutor::new(limiter, RetryPolicy::new(3, Duration::from_millis(1)));
        HistoryExporter::new(Arc::new(provider), executor, FetchSettings::default())
    }

    #[tokio::test]
    async fn test_single_account_export() {
        let provider = MockTrendProvider::new(vec![account("a1", "Checking")]).with_monthly(
            "a1",
            ReportKind::AssetsTime,
            monthly_asset(&[("2021-01-01", 100.0), ("2021-02-01", 200.0)]),
        );
        let exporter = exporter(provider);

        let accounts = vec![account("a1", "Checking")];
        let histories = exporter
            .export_all_as_of(&accounts, date("2021-03-15"), None)
            .await
            .unwrap();

        assert_eq!(histories.len(), 1);
        assert_eq!(histories[0].report_kind, Some(ReportKind::AssetsTime));
        // Jan 1 through Mar 15 inclusive.
        assert_eq!(histories[0].entries.len(), 74);
        assert_eq!(histories[0].entries.first().unwrap().date, date("2021-01-01"));
        assert_eq!(histories[0].entries.last().unwrap().date, date("2021-03-15"));
    }

    #[tokio::test]
    async fn test_debt_account_resolves_via_second_probe() {
        let provider = MockTrendProvider::new(vec![account("c1", "Card")]).with_monthly(
            "c1",
            ReportKind::DebtsTime,
            monthly_asset(&[("2021-01-01", 100.0)]),
        );
        let exporter = exporter(provider);

        let histories = exporter
            .export_all_as_of(&[account("c1", "Card")], date("2021-01-31"), None)
            .await
            .unwrap();
        assert_eq!(histories[0].report_kind, Some(ReportKind::DebtsTime));
        assert!(histories[0].entries.iter().all(|e| e.amount < 0.0));
    }

    #[tokio::test]
    async fn test_unprobeable_account_is_structural_error() {
        // No kind scripted for this account: both probes answer None.
        let provider = MockTrendProvider::new(vec![account("x", "Mystery")]);
        let exporter = exporter(provider);

        let result = exporter
            .export_all_as_of(&[account("x", "Mystery")], date("2021-01-31"), None)
            .await;
        assert!(matches!(
            result,
            Err(ExportError::ReportKindUnresolved { .. })
        ));
    }

    #[tokio::test]
    async fn test_empty_history_isolated_to_empty_slot() {
        let provider = MockTrendProvider::new(vec![])
            .with_monthly("a1", ReportKind::AssetsTime, vec![])
            .with_monthly(
                "a2",
                ReportKind::AssetsTime,
                monthly_asset(&[("2021-01-01", 50.0)]),
            );
        let exporter = exporter(provider);

        let accounts = vec![account("a1", "Empty"), account("a2", "Full")];
        let histories = exporter
            .export_all_as_of(&accounts, date("2021-01-10"), None)
            .await
            .unwrap();

        assert_eq!(histories[0].report_kind, None);
        assert!(histories[0].entries.is_empty());
        assert!(!histories[1].entries.is_empty());
    }

    #[tokio::test]
    async fn test_progress_monotonic_and_complete() {
        let provider = MockTrendProvider::new(vec![])
            .with_monthly(
                "a1",
                ReportKind::AssetsTime,
                monthly_asset(&[("2020-09-01", 10.0), ("2021-01-01", 20.0)]),
            )
            .with_monthly(
                "a2",
                ReportKind::DebtsTime,
                monthly_asset(&[("2021-01-01", 30.0)]),
            );
        let exporter = exporter(provider);

        let events: Arc<Mutex<Vec<ProgressEvent>>> = Arc::new(Mutex::new(Vec::new()));
        let observer: ProgressCallback = {
            let events = events.clone();
            Arc::new(move |event| events.lock().push(event))
        };

        let accounts = vec![account("a1", "One"), account("a2", "Two")];
        exporter
            .export_all_as_of(&accounts, date("2021-02-01"), Some(observer))
            .await
            .unwrap();

        let events = events.lock();
        assert!(!events.is_empty());

        let mut last_pct = 0.0;
        let mut ones = 0;
        for event in events.iter() {
            let ProgressEvent::History {
                complete_percentage,
                total_accounts,
                ..
            } = event
            else {
                panic!("history export must emit history events");
            };
            assert_eq!(*total_accounts, 2);
            assert!(*complete_percentage >= last_pct);
            if *complete_percentage == 1.0 && last_pct < 1.0 {
                ones += 1;
            }
            last_pct = *complete_percentage;
        }
        // Percentage crosses into 1.0 exactly once.
        assert_eq!(ones, 1);
        assert_eq!(last_pct, 1.0);

        let final_event = events.last().unwrap();
        assert_eq!(
            *final_event,
            ProgressEvent::History {
                completed_accounts: 2,
                total_accounts: 2,
                complete_percentage: 1.0,
            }
        );
    }

    #[tokio::test]
    async fn test_transient_probe_failure_retried() {
        let provider = MockTrendProvider::new(vec![])
            .with_monthly(
                "a1",
                ReportKind::AssetsTime,
                monthly_asset(&[("2021-01-01", 10.0)]),
            )
            .fail_first_trend_calls(1);
        let exporter = exporter(provider);

        let histories = exporter
            .export_all_as_of(&[account("a1", "Flaky")], date("2021-01-05"), None)
            .await
            .unwrap();
        assert_eq!(histories[0].report_kind, Some(ReportKind::AssetsTime));
        assert!(!histories[0].entries.is_empty());
    }
}
