//! CSV encoding of tables.

use crate::error::{ExportError, ExportResult};

use super::table::Table;

/// Encode a table as a CSV string, header row first.
pub fn table_to_csv(table: &Table) -> ExportResult<String> {
    let mut writer = csv::Writer::from_writer(vec![]);

    writer
        .write_record(&table.header)
        .map_err(|e| ExportError::Encode(e.to_string()))?;
    for row in &table.rows {
        writer
            .write_record(row)
            .map_err(|e| ExportError::Encode(e.to_string()))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| ExportError::Encode(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| ExportError::Encode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_then_rows_one_per_line() {
        let table = Table {
            header: vec!["Date".into(), "Amount".into()],
            rows: vec![
                vec!["2021-01-01".into(), "100".into()],
                vec!["2021-01-02".into(), "101.5".into()],
            ],
        };

        let csv = table_to_csv(&table).unwrap();
        assert_eq!(csv, "Date,Amount\n2021-01-01,100\n2021-01-02,101.5\n");
    }

    #[test]
    fn test_fields_with_commas_are_quoted() {
        let table = Table {
            header: vec!["Date".into(), "Amount".into(), "Account".into()],
            rows: vec![vec![
                "2021-01-01".into(),
                "100".into(),
                "Checking, Joint".into(),
            ]],
        };

        let csv = table_to_csv(&table).unwrap();
        assert!(csv.contains("\"Checking, Joint\""));
    }
}
