//! Pairing of opposite-typed trend entries.
//!
//! Net-style reports interleave two series (assets/debts or
//! income/expenses) as separate entries sharing a date. The provider emits
//! the positive member of a pair even when its counterpart is exactly zero,
//! and omits the pairing entirely in that case, a quirk this step
//! tolerates rather than corrects.

use crate::model::BalanceEntry;

/// Merge adjacent opposite-typed entries into single records.
///
/// Input is date-ordered with at most two entries per date, one of each
/// type. For each entry, the following entry is consumed as its
/// `inverse_amount` when the types differ; otherwise the inverse defaults
/// to 0. The inverse is stored as a magnitude so that
/// `amount - inverse_amount` yields the net value.
pub fn zip_entries(entries: &[BalanceEntry]) -> Vec<BalanceEntry> {
    let mut merged = Vec::with_capacity(entries.len());
    let mut i = 0;

    while i < entries.len() {
        let mut entry = entries[i].clone();
        match entries.get(i + 1) {
            Some(next) if next.trend_type != entry.trend_type => {
                entry.inverse_amount = Some(next.amount.abs());
                i += 2;
            }
            _ => {
                entry.inverse_amount = Some(0.0);
                i += 1;
            }
        }
        merged.push(entry);
    }

    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TrendType;
    use chrono::NaiveDate;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn entry(d: &str, amount: f64, trend_type: TrendType) -> BalanceEntry {
        BalanceEntry::from_reported(amount, date(d), trend_type)
    }

    #[test]
    fn test_alternating_pairs_merge_per_date() {
        let entries = vec![
            entry("2021-01-01", 100.0, TrendType::Asset),
            entry("2021-01-01", 40.0, TrendType::Debt),
            entry("2021-02-01", 200.0, TrendType::Asset),
            entry("2021-02-01", 50.0, TrendType::Debt),
        ];

        let merged = zip_entries(&entries);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].amount, 100.0);
        assert_eq!(merged[0].inverse(), 40.0);
        assert_eq!(merged[1].amount, 200.0);
        assert_eq!(merged[1].inverse(), 50.0);
    }

    #[test]
    fn test_missing_pair_defaults_inverse_to_zero() {
        // February has no debt entry.
        let entries = vec![
            entry("2021-01-01", 100.0, TrendType::Asset),
            entry("2021-01-01", 40.0, TrendType::Debt),
            entry("2021-02-01", 200.0, TrendType::Asset),
            entry("2021-03-01", 300.0, TrendType::Asset),
            entry("2021-03-01", 60.0, TrendType::Debt),
        ];

        let merged = zip_entries(&entries);
        assert_eq!(merged.len(), 3);
        assert_eq!(merged[1].date, date("2021-02-01"));
        assert_eq!(merged[1].inverse(), 0.0);
        assert_eq!(merged[2].inverse(), 60.0);
    }

    #[test]
    fn test_inverse_is_a_magnitude() {
        // Debt amounts are negative after ingestion; the inverse column
        // still reads as a positive magnitude.
        let entries = vec![
            entry("2021-01-01", 100.0, TrendType::Asset),
            entry("2021-01-01", 40.0, TrendType::Debt),
        ];
        let merged = zip_entries(&entries);
        assert_eq!(merged[0].inverse(), 40.0);
        assert_eq!(merged[0].amount - merged[0].inverse(), 60.0);
    }

    #[test]
    fn test_empty_input() {
        assert!(zip_entries(&[]).is_empty());
    }
}
