//! Tabular encoding of entry sequences.
//!
//! Columns depend on the report kind: net-style kinds emit paired columns
//! plus a computed Net column; everything else is a single Amount column.
//! Trailing all-zero rows are trimmed from the end, but a table built from
//! at least one entry never trims down to nothing.

use crate::model::{BalanceEntry, ReportKind};

/// Header plus data rows, ready for CSV encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Encode entries into a table for the given report kind.
///
/// `account_name` appends an Account column for per-account (not
/// aggregated) exports.
pub fn to_table(
    entries: &[BalanceEntry],
    account_name: Option<&str>,
    report_kind: ReportKind,
) -> Table {
    let paired = report_kind.paired_columns();

    let mut header: Vec<String> = match paired {
        Some((primary, inverse)) => vec![
            "Date".to_string(),
            primary.to_string(),
            inverse.to_string(),
            "Net".to_string(),
        ],
        None => vec!["Date".to_string(), "Amount".to_string()],
    };
    if account_name.is_some() {
        header.push("Account".to_string());
    }

    let len = trimmed_len(entries, paired.is_some());
    let rows = entries[..len]
        .iter()
        .map(|entry| {
            let mut row = vec![entry.date.to_string(), format_amount(entry.amount)];
            if paired.is_some() {
                let inverse = entry.inverse();
                row.push(format_amount(inverse));
                row.push(format!("{:.2}", entry.amount - inverse));
            }
            if let Some(name) = account_name {
                row.push(name.to_string());
            }
            row
        })
        .collect();

    Table { header, rows }
}

/// Length after dropping trailing zero rows, never below 1 for non-empty
/// input.
fn trimmed_len(entries: &[BalanceEntry], paired: bool) -> usize {
    let mut len = entries.len();
    while len > 1 {
        let entry = &entries[len - 1];
        let zero = entry.amount == 0.0 && (!paired || entry.inverse() == 0.0);
        if !zero {
            break;
        }
        len -= 1;
    }
    len
}

fn format_amount(value: f64) -> String {
    // f64 Display keeps integral balances free of a trailing ".0".
    format!("{value}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TrendType;
    use chrono::NaiveDate;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn entry(d: &str, amount: f64) -> BalanceEntry {
        BalanceEntry::from_reported(amount, date(d), TrendType::Asset)
    }

    fn paired_entry(d: &str, amount: f64, inverse: f64) -> BalanceEntry {
        let mut e = entry(d, amount);
        e.inverse_amount = Some(inverse);
        e
    }

    #[test]
    fn test_net_worth_table_with_trailing_zero_dropped() {
        let entries = vec![
            paired_entry("2021-01-01", 100.0, 40.0),
            paired_entry("2021-02-01", 0.0, 0.0),
        ];

        let table = to_table(&entries, None, ReportKind::NetWorth);
        assert_eq!(table.header, vec!["Date", "Assets", "Debts", "Net"]);
        assert_eq!(
            table.rows,
            vec![vec!["2021-01-01", "100", "40", "60.00"]]
        );
    }

    #[test]
    fn test_net_income_columns() {
        let entries = vec![paired_entry("2021-01-01", 500.5, 120.25)];
        let table = to_table(&entries, None, ReportKind::NetIncome);
        assert_eq!(table.header, vec!["Date", "Income", "Expenses", "Net"]);
        assert_eq!(
            table.rows,
            vec![vec!["2021-01-01", "500.5", "120.25", "380.25"]]
        );
    }

    #[test]
    fn test_single_amount_column_for_plain_kinds() {
        let entries = vec![entry("2021-01-01", 100.0), entry("2021-01-02", 101.0)];
        let table = to_table(&entries, None, ReportKind::AssetsTime);
        assert_eq!(table.header, vec!["Date", "Amount"]);
        assert_eq!(table.rows.len(), 2);
    }

    #[test]
    fn test_account_name_column_appended() {
        let entries = vec![entry("2021-01-01", 100.0)];
        let table = to_table(&entries, Some("Checking"), ReportKind::AssetsTime);
        assert_eq!(table.header, vec!["Date", "Amount", "Account"]);
        assert_eq!(table.rows, vec![vec!["2021-01-01", "100", "Checking"]]);
    }

    #[test]
    fn test_sole_zero_row_is_kept() {
        let entries = vec![entry("2021-01-01", 0.0)];
        let table = to_table(&entries, None, ReportKind::AssetsTime);
        assert_eq!(table.rows.len(), 1);

        // Multiple all-zero rows trim down to one, never to zero.
        let entries = vec![
            entry("2021-01-01", 0.0),
            entry("2021-01-02", 0.0),
            entry("2021-01-03", 0.0),
        ];
        let table = to_table(&entries, None, ReportKind::AssetsTime);
        assert_eq!(table.rows.len(), 1);
    }

    #[test]
    fn test_paired_row_with_nonzero_inverse_not_trimmed() {
        let entries = vec![
            paired_entry("2021-01-01", 100.0, 40.0),
            paired_entry("2021-02-01", 0.0, 25.0),
        ];
        let table = to_table(&entries, None, ReportKind::NetWorth);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[1], vec!["2021-02-01", "0", "25", "-25.00"]);
    }

    #[test]
    fn test_empty_entries_empty_rows() {
        let table = to_table(&[], None, ReportKind::NetWorth);
        assert!(table.rows.is_empty());
        assert_eq!(table.header.len(), 4);
    }
}
