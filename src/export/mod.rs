//! Export encoding
//!
//! Post-processing of fetched entry sequences into CSV: conditional pairing
//! of opposite-typed entries, tabular encoding with trailing-zero trimming,
//! and CSV serialization.

mod csv;
mod table;
mod zip;

pub use self::csv::table_to_csv;
pub use table::{to_table, Table};
pub use zip::zip_entries;

use crate::error::ExportResult;
use crate::model::{BalanceEntry, ReportKind};
use crate::orchestrator::AccountHistory;

/// Encode a trend export as CSV, zipping paired kinds first.
pub fn trend_csv(entries: &[BalanceEntry], report_kind: ReportKind) -> ExportResult<String> {
    let merged;
    let entries = if report_kind.is_paired() {
        merged = zip_entries(entries);
        &merged[..]
    } else {
        entries
    };

    let table = to_table(entries, None, report_kind);
    table_to_csv(&table)
}

/// Encode a multi-account history export as one CSV with an Account column.
///
/// Trailing-zero trimming applies per account; accounts that produced no
/// entries contribute no rows and simply appear as missing balances.
pub fn history_csv(histories: &[AccountHistory]) -> ExportResult<String> {
    let mut combined = Table {
        header: vec![
            "Date".to_string(),
            "Amount".to_string(),
            "Account".to_string(),
        ],
        rows: Vec::new(),
    };

    for history in histories {
        let kind = history.report_kind.unwrap_or(ReportKind::AssetsTime);
        let table = to_table(&history.entries, Some(&history.account.name), kind);
        combined.rows.extend(table.rows);
    }

    table_to_csv(&combined)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Account, AccountKind, TrendType};
    use chrono::NaiveDate;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn entry(d: &str, amount: f64, trend_type: TrendType) -> BalanceEntry {
        BalanceEntry::from_reported(amount, date(d), trend_type)
    }

    #[test]
    fn test_trend_csv_zips_paired_kinds() {
        let entries = vec![
            entry("2021-01-01", 100.0, TrendType::Asset),
            entry("2021-01-01", 40.0, TrendType::Debt),
        ];

        let csv = trend_csv(&entries, ReportKind::NetWorth).unwrap();
        assert_eq!(csv, "Date,Assets,Debts,Net\n2021-01-01,100,40,60.00\n");
    }

    #[test]
    fn test_trend_csv_plain_kind_unzipped() {
        let entries = vec![
            entry("2021-01-01", 100.0, TrendType::Asset),
            entry("2021-01-02", 110.0, TrendType::Asset),
        ];

        let csv = trend_csv(&entries, ReportKind::AssetsTime).unwrap();
        assert_eq!(csv, "Date,Amount\n2021-01-01,100\n2021-01-02,110\n");
    }

    #[test]
    fn test_history_csv_combines_accounts() {
        let account = |id: &str, name: &str| Account {
            id: id.to_string(),
            name: name.to_string(),
            kind: AccountKind::Bank,
        };
        let histories = vec![
            AccountHistory {
                account: account("a1", "Checking"),
                report_kind: Some(ReportKind::AssetsTime),
                entries: vec![entry("2021-01-01", 100.0, TrendType::Asset)],
            },
            AccountHistory {
                account: account("a2", "Empty"),
                report_kind: None,
                entries: vec![],
            },
            AccountHistory {
                account: account("a3", "Card"),
                report_kind: Some(ReportKind::DebtsTime),
                entries: vec![entry("2021-01-01", 75.0, TrendType::Debt)],
            },
        ];

        let csv = history_csv(&histories).unwrap();
        assert_eq!(
            csv,
            "Date,Amount,Account\n2021-01-01,100,Checking\n2021-01-01,-75,Card\n"
        );
    }
}
