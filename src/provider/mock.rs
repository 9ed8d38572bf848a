//! Mock trend provider for testing
//!
//! Scriptable implementation of the provider traits for tests and offline
//! development: fixed accounts, per-kind monthly probe tables, generated
//! daily series, and failure injection for exercising the retry and
//! isolation paths.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::Days;

use crate::model::{Account, BalanceEntry, ReportKind, TrendFilter, TrendType};
use crate::windows::Window;

use super::traits::{ProviderError, ProviderResult, TrendProvider};

/// Any window longer than this is treated as a monthly-granularity probe;
/// shorter windows get generated daily series.
const PROBE_SPAN_DAYS: i64 = 366;

/// Mock trend provider.
pub struct MockTrendProvider {
    accounts: Vec<Account>,
    /// Monthly probe tables keyed by (account id, report kind). A missing
    /// key means the kind does not apply to that account.
    monthly: HashMap<(String, ReportKind), Vec<BalanceEntry>>,
    /// Scripted full-report series per kind, filtered by window on fetch.
    reports: HashMap<ReportKind, Vec<BalanceEntry>>,
    /// Amount used for generated daily entries.
    pub daily_amount: f64,
    /// Fail this many trend calls with a transient request error first.
    fail_first: AtomicUsize,
    /// Answer this many trend calls with an empty payload first.
    swallow_first: AtomicUsize,
    trend_calls: AtomicUsize,
}

impl MockTrendProvider {
    pub fn new(accounts: Vec<Account>) -> Self {
        Self {
            accounts,
            monthly: HashMap::new(),
            reports: HashMap::new(),
            daily_amount: 100.0,
            fail_first: AtomicUsize::new(0),
            swallow_first: AtomicUsize::new(0),
            trend_calls: AtomicUsize::new(0),
        }
    }

    /// Script the monthly probe result for one account and kind.
    pub fn with_monthly(
        mut self,
        account_id: &str,
        kind: ReportKind,
        entries: Vec<BalanceEntry>,
    ) -> Self {
        self.monthly
            .insert((account_id.to_string(), kind), entries);
        self
    }

    /// Script the full-report series for one kind.
    pub fn with_report(mut self, kind: ReportKind, entries: Vec<BalanceEntry>) -> Self {
        self.reports.insert(kind, entries);
        self
    }

    /// Fail the first `n` trend calls with a transient error.
    pub fn fail_first_trend_calls(self, n: usize) -> Self {
        self.fail_first.store(n, Ordering::SeqCst);
        self
    }

    /// Answer the first `n` trend calls with an absent payload.
    pub fn swallow_first_trend_calls(self, n: usize) -> Self {
        self.swallow_first.store(n, Ordering::SeqCst);
        self
    }

    /// Number of trend calls made so far.
    pub fn trend_calls(&self) -> usize {
        self.trend_calls.load(Ordering::SeqCst)
    }

    fn daily_trend_type(kind: ReportKind) -> TrendType {
        match kind {
            ReportKind::AssetsTime | ReportKind::NetWorth => TrendType::Asset,
            ReportKind::DebtsTime => TrendType::Debt,
            ReportKind::IncomeTime | ReportKind::NetIncome => TrendType::Income,
            ReportKind::SpendingTime => TrendType::Expense,
        }
    }

    fn generate_daily(&self, kind: ReportKind, window: &Window) -> Vec<BalanceEntry> {
        let trend_type = Self::daily_trend_type(kind);
        let mut entries = Vec::with_capacity(window.span_days() as usize);
        let mut date = window.start;
        while date <= window.end {
            entries.push(BalanceEntry::from_reported(
                self.daily_amount,
                date,
                trend_type,
            ));
            date = date + Days::new(1);
        }
        entries
    }

    fn take_injected_failure(&self) -> Option<ProviderResult<Option<Vec<BalanceEntry>>>> {
        if decrement_if_positive(&self.fail_first) {
            return Some(Err(ProviderError::Request(
                "injected transient failure".to_string(),
            )));
        }
        if decrement_if_positive(&self.swallow_first) {
            return Some(Ok(None));
        }
        None
    }
}

fn decrement_if_positive(counter: &AtomicUsize) -> bool {
    counter
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
        .is_ok()
}

#[async_trait]
impl TrendProvider for MockTrendProvider {
    async fn fetch_accounts(&self, offset: usize, limit: usize) -> ProviderResult<Vec<Account>> {
        Ok(self
            .accounts
            .iter()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn fetch_trends(
        &self,
        report_kind: ReportKind,
        filter: &TrendFilter,
        window: &Window,
        _offset: usize,
        _limit: usize,
    ) -> ProviderResult<Option<Vec<BalanceEntry>>> {
        self.trend_calls.fetch_add(1, Ordering::SeqCst);

        if let Some(injected) = self.take_injected_failure() {
            return injected;
        }

        // Single-account path: probe answers come from the scripted monthly
        // table, short windows produce generated daily series.
        if let [account_id] = filter.account_ids.as_slice() {
            let key = (account_id.clone(), report_kind);
            let Some(monthly) = self.monthly.get(&key) else {
                return Ok(None);
            };
            if window.span_days() > PROBE_SPAN_DAYS {
                return Ok(Some(monthly.clone()));
            }
            return Ok(Some(self.generate_daily(report_kind, window)));
        }

        // Report path: scripted series filtered to the window.
        Ok(self.reports.get(&report_kind).map(|entries| {
            entries
                .iter()
                .filter(|e| e.date >= window.start && e.date <= window.end)
                .cloned()
                .collect()
        }))
    }
}
