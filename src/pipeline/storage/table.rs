use std::path::Path;

use serde::Serialize;

use super::StorageError;
use crate::models::ResultRow;

pub const COL_TEST_NAME: &str = "Test Name";
pub const COL_VALUE: &str = "Value";
pub const COL_UNITS: &str = "Units";
pub const COL_REFERENCE_RANGE: &str = "Reference Range";

/// Header of a full results table.
pub const TABLE_HEADER: [&str; 4] = [COL_TEST_NAME, COL_VALUE, COL_UNITS, COL_REFERENCE_RANGE];

/// Header written when the full table could not be produced.
pub const MINIMAL_HEADER: [&str; 2] = [COL_TEST_NAME, COL_VALUE];

/// Which layout `save_table` ended up writing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TableLayout {
    Full,
    Minimal,
}

fn csv_writer() -> csv::Writer<Vec<u8>> {
    csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new())
}

fn finish(writer: csv::Writer<Vec<u8>>) -> Result<Vec<u8>, StorageError> {
    writer
        .into_inner()
        .map_err(|e| StorageError::Io(e.into_error()))
}

/// Encode rows as a UTF-8 CSV table with the four-column header.
///
/// Fields are quoted only when needed, so values containing commas, quotes
/// or newlines still read back unchanged.
pub fn write_table(rows: &[ResultRow]) -> Result<Vec<u8>, StorageError> {
    let mut writer = csv_writer();
    writer.write_record(TABLE_HEADER)?;
    for row in rows {
        writer.write_record([
            &row.test_name,
            &row.value,
            &row.units,
            &row.reference_range,
        ])?;
    }
    finish(writer)
}

/// Encode only the name and value of each row.
pub fn write_minimal_table(rows: &[ResultRow]) -> Result<Vec<u8>, StorageError> {
    let mut writer = csv_writer();
    writer.write_record(MINIMAL_HEADER)?;
    for row in rows {
        writer.write_record([&row.test_name, &row.value])?;
    }
    finish(writer)
}

/// Decode a results table.
///
/// Columns are located by header name, so both the full and the minimal
/// layout are accepted; missing `Units` / `Reference Range` cells read as
/// empty strings.
pub fn read_table(bytes: &[u8]) -> Result<Vec<ResultRow>, StorageError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(bytes);

    let headers = reader.headers()?.clone();
    let column = |name: &str| headers.iter().position(|h| h.trim() == name);

    let name_idx = column(COL_TEST_NAME).ok_or(StorageError::MissingColumn(COL_TEST_NAME))?;
    let value_idx = column(COL_VALUE).ok_or(StorageError::MissingColumn(COL_VALUE))?;
    let units_idx = column(COL_UNITS);
    let range_idx = column(COL_REFERENCE_RANGE);

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let cell = |idx: Option<usize>| {
            idx.and_then(|i| record.get(i))
                .unwrap_or_default()
                .to_string()
        };
        rows.push(ResultRow {
            test_name: cell(Some(name_idx)),
            value: cell(Some(value_idx)),
            units: cell(units_idx),
            reference_range: cell(range_idx),
        });
    }
    Ok(rows)
}

/// Read a results table from disk.
pub fn read_table_file(path: &Path) -> Result<Vec<ResultRow>, StorageError> {
    let bytes = std::fs::read(path)?;
    read_table(&bytes)
}

/// Persist rows at `path`, falling back to the two-column layout if the
/// full table cannot be written.
pub fn save_table(rows: &[ResultRow], path: &Path) -> Result<TableLayout, StorageError> {
    save_table_with(rows, path, write_table)
}

/// `save_table` with an injectable encoder for the full layout.
pub fn save_table_with<F>(
    rows: &[ResultRow],
    path: &Path,
    encode: F,
) -> Result<TableLayout, StorageError>
where
    F: FnOnce(&[ResultRow]) -> Result<Vec<u8>, StorageError>,
{
    let full = encode(rows).and_then(|bytes| std::fs::write(path, bytes).map_err(StorageError::from));
    match full {
        Ok(()) => {
            tracing::info!(path = %path.display(), rows = rows.len(), "Results table saved");
            Ok(TableLayout::Full)
        }
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "Full table write failed, writing name/value columns only"
            );
            let bytes = write_minimal_table(rows)?;
            std::fs::write(path, bytes)?;
            Ok(TableLayout::Minimal)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn sample_rows() -> Vec<ResultRow> {
        vec![
            ResultRow::new("Glucose", "105", "mg/dL", "70-99"),
            ResultRow::new("Platelets", "250", "Normal", ""),
            ResultRow::name_value("CRP", "<5"),
        ]
    }

    #[test]
    fn header_row_is_fixed() {
        let bytes = write_table(&[]).unwrap();
        assert_eq!(
            String::from_utf8(bytes).unwrap(),
            "Test Name,Value,Units,Reference Range\n"
        );
    }

    #[test]
    fn empty_fields_serialize_as_empty_strings() {
        let bytes = write_table(&[ResultRow::name_value("CRP", "<5")]).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.ends_with("CRP,<5,,\n"), "got: {text}");
    }

    #[test]
    fn write_then_read_round_trips() {
        let rows = sample_rows();
        let bytes = write_table(&rows).unwrap();
        assert_eq!(read_table(&bytes).unwrap(), rows);
    }

    #[test]
    fn fields_with_delimiters_and_unicode_round_trip() {
        let rows = vec![
            ResultRow::new("Cholesterol, total", "190", "mg/dL", "< 200 \"desirable\""),
            ResultRow::new("TSH", "2.1", "μIU/mL", "0.4-4.0\n(adult)"),
            ResultRow::new("  padded  ", " 5 ", "", " 1-9 "),
        ];
        let bytes = write_table(&rows).unwrap();
        assert_eq!(read_table(&bytes).unwrap(), rows);
    }

    #[test]
    fn reads_minimal_layout() {
        let bytes = write_minimal_table(&sample_rows()).unwrap();
        let text = String::from_utf8(bytes.clone()).unwrap();
        assert!(text.starts_with("Test Name,Value\n"));

        let rows = read_table(&bytes).unwrap();
        assert_eq!(rows[0], ResultRow::name_value("Glucose", "105"));
        assert_eq!(rows.len(), 3);
    }

    #[test]
    fn reads_columns_by_header_name() {
        let csv = "Reference Range,Units,Value,Test Name\n70-99,mg/dL,105,Glucose\n";
        let rows = read_table(csv.as_bytes()).unwrap();
        assert_eq!(rows, vec![ResultRow::new("Glucose", "105", "mg/dL", "70-99")]);
    }

    #[test]
    fn missing_value_column_is_an_error() {
        let csv = "Test Name,Units\nGlucose,mg/dL\n";
        let result = read_table(csv.as_bytes());
        assert!(matches!(result, Err(StorageError::MissingColumn("Value"))));
    }

    #[test]
    fn short_records_fill_with_empty_strings() {
        let csv = "Test Name,Value,Units,Reference Range\nGlucose,105\n";
        let rows = read_table(csv.as_bytes()).unwrap();
        assert_eq!(rows, vec![ResultRow::name_value("Glucose", "105")]);
    }

    #[test]
    fn save_table_writes_full_layout() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.csv");

        let layout = save_table(&sample_rows(), &path).unwrap();
        assert_eq!(layout, TableLayout::Full);
        assert_eq!(read_table_file(&path).unwrap(), sample_rows());
    }

    #[test]
    fn save_table_falls_back_to_minimal_layout() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.csv");

        let layout = save_table_with(&sample_rows(), &path, |_| {
            Err(StorageError::Io(std::io::Error::other("disk quota")))
        })
        .unwrap();
        assert_eq!(layout, TableLayout::Minimal);

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("Test Name,Value\n"));
        let rows = read_table_file(&path).unwrap();
        let pairs: Vec<(&str, &str)> = rows
            .iter()
            .map(|r| (r.test_name.as_str(), r.value.as_str()))
            .collect();
        assert_eq!(pairs, vec![("Glucose", "105"), ("Platelets", "250"), ("CRP", "<5")]);
    }

    #[test]
    fn save_table_reports_second_failure() {
        let path = Path::new("/nonexistent/labwise/dir/report.csv");
        assert!(save_table(&sample_rows(), path).is_err());
    }

    fn row_strategy(name: &'static str, field: &'static str) -> impl Strategy<Value = ResultRow> {
        (name, field, field, field).prop_map(|(n, v, u, r)| ResultRow::new(n, v, u, r))
    }

    proptest! {
        #[test]
        fn any_rows_round_trip(rows in prop::collection::vec(row_strategy("\\PC{1,16}", "\\PC{0,16}"), 0..8)) {
            let bytes = write_table(&rows).unwrap();
            prop_assert_eq!(read_table(&bytes).unwrap(), rows);
        }

        #[test]
        fn rows_with_quotes_and_line_breaks_round_trip(
            rows in prop::collection::vec(row_strategy("[a-z ,\"\n]{1,12}", "[0-9 ,\"\n<>.-]{0,12}"), 1..6)
        ) {
            let bytes = write_table(&rows).unwrap();
            prop_assert_eq!(read_table(&bytes).unwrap(), rows);
        }
    }
}
