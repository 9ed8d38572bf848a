//! Domain types for balance history and trend exports.
//!
//! These types are normalized at ingestion: the provider reports DEBT
//! magnitudes as positive numbers, so [`BalanceEntry::from_reported`]
//! applies the sign before an entry enters the pipeline. Everything
//! downstream can assume `amount` already carries its sign.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// The type of a single trend observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TrendType {
    Debt,
    Asset,
    Income,
    Expense,
}

/// One dated balance observation.
///
/// `inverse_amount` is the paired opposite-typed amount for the same date,
/// populated by the zip step for net-style reports. Absent means 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceEntry {
    pub amount: f64,
    pub date: NaiveDate,
    pub trend_type: TrendType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inverse_amount: Option<f64>,
}

impl BalanceEntry {
    /// Build an entry from provider-reported values, applying sign
    /// normalization: DEBT balances are stored negative regardless of the
    /// sign the provider used. Other types keep the reported sign.
    pub fn from_reported(amount: f64, date: NaiveDate, trend_type: TrendType) -> Self {
        let amount = match trend_type {
            TrendType::Debt => -amount.abs(),
            _ => amount,
        };
        Self {
            amount,
            date,
            trend_type,
            inverse_amount: None,
        }
    }

    /// The paired opposite-typed amount, defaulting to 0 when absent.
    pub fn inverse(&self) -> f64 {
        self.inverse_amount.unwrap_or(0.0)
    }
}

/// The nine account kinds the provider reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountKind {
    Bank,
    CreditCard,
    Investment,
    Loan,
    Mortgage,
    Cash,
    RealEstate,
    Vehicle,
    OtherProperty,
}

impl fmt::Display for AccountKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AccountKind::Bank => "bank",
            AccountKind::CreditCard => "credit_card",
            AccountKind::Investment => "investment",
            AccountKind::Loan => "loan",
            AccountKind::Mortgage => "mortgage",
            AccountKind::Cash => "cash",
            AccountKind::RealEstate => "real_estate",
            AccountKind::Vehicle => "vehicle",
            AccountKind::OtherProperty => "other_property",
        };
        f.write_str(name)
    }
}

/// A provider account. Immutable for the duration of one export run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: String,
    pub name: String,
    pub kind: AccountKind,
}

/// The category of time series requested from the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReportKind {
    AssetsTime,
    DebtsTime,
    IncomeTime,
    SpendingTime,
    NetIncome,
    NetWorth,
}

impl ReportKind {
    /// Net-style kinds carry two opposite-typed series that the zip step
    /// merges into paired rows.
    pub fn is_paired(&self) -> bool {
        matches!(self, ReportKind::NetIncome | ReportKind::NetWorth)
    }

    /// Column labels for the paired kinds, `(primary, inverse)`.
    pub fn paired_columns(&self) -> Option<(&'static str, &'static str)> {
        match self {
            ReportKind::NetWorth => Some(("Assets", "Debts")),
            ReportKind::NetIncome => Some(("Income", "Expenses")),
            _ => None,
        }
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ReportKind::AssetsTime => "assets",
            ReportKind::DebtsTime => "debts",
            ReportKind::IncomeTime => "income",
            ReportKind::SpendingTime => "spending",
            ReportKind::NetIncome => "net-income",
            ReportKind::NetWorth => "net-worth",
        };
        f.write_str(name)
    }
}

impl FromStr for ReportKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "assets" | "assets_time" => Ok(ReportKind::AssetsTime),
            "debts" | "debts_time" => Ok(ReportKind::DebtsTime),
            "income" | "income_time" => Ok(ReportKind::IncomeTime),
            "spending" | "expense" | "spending_time" => Ok(ReportKind::SpendingTime),
            "net-income" | "net_income" => Ok(ReportKind::NetIncome),
            "net-worth" | "net_worth" => Ok(ReportKind::NetWorth),
            other => Err(format!("unsupported report kind: {other}")),
        }
    }
}

/// Account filter applied to a trend request.
///
/// `account_ids` restricts the series to specific accounts (empty means all);
/// `deselected_account_ids` excludes accounts from an otherwise-full report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendFilter {
    #[serde(default)]
    pub account_ids: Vec<String>,
    #[serde(default)]
    pub deselected_account_ids: Vec<String>,
}

impl TrendFilter {
    /// Filter down to a single account.
    pub fn account(id: impl Into<String>) -> Self {
        Self {
            account_ids: vec![id.into()],
            ..Self::default()
        }
    }

    /// Full report minus the given accounts.
    pub fn excluding(ids: Vec<String>) -> Self {
        Self {
            deselected_account_ids: ids,
            ..Self::default()
        }
    }
}

/// Describes which accounts and date range a report-style export covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrendSelection {
    pub report_kind: ReportKind,
    pub deselected_account_ids: Vec<String>,
    pub from_date: NaiveDate,
    pub to_date: NaiveDate,
}
