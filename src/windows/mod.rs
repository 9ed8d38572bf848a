//! Window resolution for history fetching.
//!
//! The provider serves daily balances in bounded date windows, one request
//! per account per window. Given an account's monthly history probe, this
//! module determines the full calendar span needing daily-resolution
//! fetching and splits it into contiguous windows no longer than the
//! configured maximum. Pure functions; no I/O.

use chrono::{Datelike, Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{ExportError, ExportResult};
use crate::model::BalanceEntry;

/// A bounded date range submitted as one fetch request. Both ends inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Window {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Window {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        debug_assert!(end >= start);
        Self { start, end }
    }

    /// Number of calendar days this window covers, inclusive of both ends.
    pub fn span_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

/// First day of the month containing `date`.
fn floor_to_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).expect("day 1 exists in every month")
}

/// Last day of the month containing `date`.
fn end_of_month(date: NaiveDate) -> NaiveDate {
    floor_to_month(date) + Months::new(1) - Days::new(1)
}

/// Resolve the windows covering an account's full daily balance history.
///
/// The span starts at the first probe entry's month. When the probe ends in
/// one or more zero-balance months, the provider may still report daily
/// balances trailing slightly past the last nonzero month, so the end
/// advances one month past the last trailing zero month (end-of-month);
/// otherwise the span runs to `today`. The end never passes `today`.
///
/// A probe that is entirely zero is treated like one with trailing zeros:
/// the last reported month still bounds the span.
pub fn resolve_windows(
    monthly_history: &[BalanceEntry],
    max_window_days: u32,
    today: NaiveDate,
) -> ExportResult<Vec<Window>> {
    let first = monthly_history.first().ok_or(ExportError::NoHistory)?;
    let last = monthly_history.last().expect("non-empty");

    let start = floor_to_month(first.date);

    let trailing_zero_months = monthly_history
        .iter()
        .rev()
        .take_while(|e| e.amount == 0.0)
        .count();

    let end = if trailing_zero_months > 0 {
        end_of_month(last.date + Months::new(1)).min(today)
    } else {
        today
    };

    Ok(split_range(start, end.max(start), max_window_days))
}

/// Split an inclusive date range into consecutive windows of at most
/// `max_window_days` days each, the final window clipped to `end`.
pub fn split_range(start: NaiveDate, end: NaiveDate, max_window_days: u32) -> Vec<Window> {
    let max_window_days = max_window_days.max(1);
    let mut windows = Vec::new();
    let mut cursor = start;

    while cursor <= end {
        let window_end = (cursor + Days::new(max_window_days as u64 - 1)).min(end);
        windows.push(Window::new(cursor, window_end));
        cursor = window_end + Days::new(1);
    }

    windows
}
