//! Per-file averaging of benchmark trials.
//!
//! Each result file is read into a column table, the two measured columns
//! are reduced to their means, and the outcome becomes one summary row.
//! Files are never merged, even when they share a combination key.

use crate::error::AggregateError;
use crate::models::{Combination, SummaryRow, MATCHES_COLUMN, TOTAL_TIME_COLUMN};
use crate::scanner::ScannedFile;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, info};

/// A result file held column-wise: header name to cell values, in row order.
///
/// Rows shorter than the header leave `None` in the trailing columns.
#[derive(Debug, Clone, Default)]
pub struct ColumnTable {
    path: PathBuf,
    headers: Vec<String>,
    columns: HashMap<String, Vec<Option<String>>>,
    rows: usize,
}

impl ColumnTable {
    /// Read a header-first CSV file.
    pub fn read(path: &Path) -> Result<Self, AggregateError> {
        let file = std::fs::File::open(path).map_err(|source| AggregateError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_reader(path, file)
    }

    /// Parse CSV from any reader; `path` is only used in error messages.
    pub fn from_reader<R: std::io::Read>(path: &Path, reader: R) -> Result<Self, AggregateError> {
        let csv_error = |source: csv::Error| AggregateError::Csv {
            path: path.to_path_buf(),
            source,
        };

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let headers: Vec<String> = reader
            .headers()
            .map_err(csv_error)?
            .iter()
            .map(String::from)
            .collect();

        let mut columns: HashMap<String, Vec<Option<String>>> = HashMap::new();
        let mut rows = 0;

        for record in reader.records() {
            let record = record.map_err(csv_error)?;
            for (index, header) in headers.iter().enumerate() {
                columns
                    .entry(header.clone())
                    .or_default()
                    .push(record.get(index).map(String::from));
            }
            rows += 1;
        }

        Ok(Self {
            path: path.to_path_buf(),
            headers,
            columns,
            rows,
        })
    }

    /// Column names in header order.
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Number of data rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Cells of `name`, or `MissingColumn`.
    pub fn column(&self, name: &str) -> Result<&[Option<String>], AggregateError> {
        if !self.headers.iter().any(|h| h == name) {
            return Err(AggregateError::MissingColumn {
                path: self.path.clone(),
                column: name.to_string(),
            });
        }

        Ok(self.columns.get(name).map(Vec::as_slice).unwrap_or_default())
    }

    /// Parse every cell of `name` as `T`.
    fn parse_column<T: FromStr>(&self, name: &str) -> Result<Vec<T>, AggregateError> {
        self.column(name)?
            .iter()
            .enumerate()
            .map(|(index, cell)| {
                let cell = cell.as_deref().ok_or_else(|| AggregateError::MissingCell {
                    path: self.path.clone(),
                    column: name.to_string(),
                    row: index + 1,
                })?;
                cell.trim().parse().map_err(|_| AggregateError::InvalidNumber {
                    path: self.path.clone(),
                    column: name.to_string(),
                    row: index + 1,
                    value: cell.to_string(),
                })
            })
            .collect()
    }

    fn ensure_rows(&self) -> Result<usize, AggregateError> {
        match self.rows {
            0 => Err(AggregateError::EmptyTable {
                path: self.path.clone(),
            }),
            n => Ok(n),
        }
    }

    /// Mean of the match counts: integer sum divided as a real number.
    ///
    /// Cells are `i64`; the sum is `i128`, which cannot overflow for any
    /// row count a file can hold.
    pub fn average_matches(&self) -> Result<f64, AggregateError> {
        let values: Vec<i64> = self.parse_column(MATCHES_COLUMN)?;
        let count = self.ensure_rows()?;
        let sum: i128 = values.iter().map(|&v| i128::from(v)).sum();
        Ok(sum as f64 / count as f64)
    }

    /// Mean of the total time column in milliseconds.
    pub fn average_total_time(&self) -> Result<f64, AggregateError> {
        let values: Vec<f64> = self.parse_column(TOTAL_TIME_COLUMN)?;
        let count = self.ensure_rows()?;
        let sum: f64 = values.iter().sum();
        Ok(sum / count as f64)
    }
}

/// Compute the summary row for one result file.
pub fn summarize_file(file: &ScannedFile) -> Result<SummaryRow, AggregateError> {
    let combination = Combination::from_file_name(&file.file_name)?;
    let table = ColumnTable::read(&file.path)?;
    debug!("{}: columns {:?}", file.path.display(), table.headers());

    let average_matches = table.average_matches()?;
    let average_time_ms = table.average_total_time()?;

    debug!(
        "{}: {} trials, {} matches, {:.2} ms",
        combination,
        table.rows(),
        average_matches,
        average_time_ms
    );

    Ok(SummaryRow {
        combination,
        source: file.path.clone(),
        trials: table.rows(),
        average_matches,
        average_time_ms,
    })
}

/// Summarize every file in visitation order, stopping at the first failure.
pub fn aggregate(files: &[ScannedFile]) -> Result<Vec<SummaryRow>, AggregateError> {
    let rows = files
        .iter()
        .map(summarize_file)
        .collect::<Result<Vec<_>, _>>()?;

    info!("Aggregated {} result files", rows.len());
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::{ResultScanner, ScanConfig};
    use tempfile::TempDir;

    const HEADER: &str =
        "Matches index,Matches number,Detector time (ms),Descriptor time (ms),Total time (ms)\n";

    fn write_result(dir: &Path, name: &str, body: &str) -> ScannedFile {
        let path = dir.join(name);
        std::fs::write(&path, body).unwrap();
        ScannedFile {
            path,
            file_name: name.to_string(),
            size: body.len() as u64,
        }
    }

    fn table(body: &str) -> ColumnTable {
        ColumnTable::from_reader(Path::new("test.csv"), body.as_bytes()).unwrap()
    }

    #[test]
    fn test_column_table_keeps_row_order() {
        let table = table("Matches number,Total time (ms)\n10,1.0\n20,3.0\n");
        assert_eq!(table.headers(), ["Matches number", "Total time (ms)"]);
        assert_eq!(table.rows(), 2);
        assert_eq!(
            table.column("Matches number").unwrap(),
            [Some("10".to_string()), Some("20".to_string())]
        );
    }

    #[test]
    fn test_averages() {
        let table = table("Matches number,Total time (ms)\n10,1.0\n20,3.0\n");
        assert_eq!(table.average_matches().unwrap(), 15.0);
        assert_eq!(table.average_total_time().unwrap(), 2.0);
    }

    #[test]
    fn test_single_row_is_identity() {
        let table = table("Matches number,Total time (ms)\n42,7.25\n");
        assert_eq!(table.average_matches().unwrap(), 42.0);
        assert_eq!(table.average_total_time().unwrap(), 7.25);
    }

    #[test]
    fn test_uneven_match_average_is_real() {
        let table = table("Matches number,Total time (ms)\n1,1\n2,1\n");
        assert_eq!(table.average_matches().unwrap(), 1.5);
    }

    #[test]
    fn test_match_sum_beyond_i64() {
        let table = table("Matches number,Total time (ms)\n9223372036854775807,1\n1,1\n");
        assert_eq!(table.average_matches().unwrap(), 4.611686018427388e18);
    }

    #[test]
    fn test_short_row_missing_unused_column() {
        let table = table(
            "Matches number,Total time (ms),Detector time (ms)\n10,1.0,0.5\n20,3.0\n",
        );
        assert_eq!(table.rows(), 2);
        assert_eq!(table.average_matches().unwrap(), 15.0);
        assert_eq!(table.average_total_time().unwrap(), 2.0);
    }

    #[test]
    fn test_short_row_missing_needed_cell() {
        let table = table("Matches number,Total time (ms)\n10,1.0\n20\n");
        assert_eq!(table.average_matches().unwrap(), 15.0);
        let err = table.average_total_time().unwrap_err();
        assert!(matches!(err, AggregateError::MissingCell { row: 2, .. }));
    }

    #[test]
    fn test_empty_table() {
        let table = table("Matches number,Total time (ms)\n");
        assert!(matches!(
            table.average_matches(),
            Err(AggregateError::EmptyTable { .. })
        ));
    }

    #[test]
    fn test_missing_column() {
        let table = table("Matches number\n10\n");
        let err = table.average_total_time().unwrap_err();
        assert!(
            matches!(err, AggregateError::MissingColumn { ref column, .. } if column == TOTAL_TIME_COLUMN)
        );
    }

    #[test]
    fn test_non_numeric_cell() {
        let table = table("Matches number,Total time (ms)\n10,1.0\nabc,2.0\n");
        let err = table.average_matches().unwrap_err();
        match err {
            AggregateError::InvalidNumber { row, value, .. } => {
                assert_eq!(row, 2);
                assert_eq!(value, "abc");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_fractional_match_count_rejected() {
        let table = table("Matches number,Total time (ms)\n10.5,1.0\n");
        assert!(matches!(
            table.average_matches(),
            Err(AggregateError::InvalidNumber { .. })
        ));
    }

    #[test]
    fn test_summarize_file() {
        let temp_dir = TempDir::new().unwrap();
        let file = write_result(
            temp_dir.path(),
            "FAST_BRIEF_data.csv",
            "Matches number,Total time (ms)\n10,1.0\n20,3.0\n",
        );

        let row = summarize_file(&file).unwrap();
        assert_eq!(row.to_record(), ["FAST", "BRIEF", "15.0", "2.00"]);
        assert_eq!(row.trials, 2);
        assert_eq!(row.combination.variant.as_deref(), Some("data"));
    }

    #[test]
    fn test_aggregate_does_not_merge_same_combination() {
        let temp_dir = TempDir::new().unwrap();
        let files = vec![
            write_result(
                temp_dir.path(),
                "ORB_BRIEF_run1.csv",
                &format!("{HEADER}1,100,1.0,1.0,2.0\n2,200,1.0,1.0,2.0\n"),
            ),
            write_result(
                temp_dir.path(),
                "ORB_BRIEF_run2.csv",
                &format!("{HEADER}1,10,0.5,0.5,1.0\n"),
            ),
        ];

        let rows = aggregate(&files).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].to_record(), ["ORB", "BRIEF", "150.0", "2.00"]);
        assert_eq!(rows[1].to_record(), ["ORB", "BRIEF", "10.0", "1.00"]);
    }

    #[test]
    fn test_aggregate_fails_on_malformed_name() {
        let temp_dir = TempDir::new().unwrap();
        let files = vec![
            write_result(temp_dir.path(), "FAST_BRIEF_a.csv", "Matches number,Total time (ms)\n1,1\n"),
            write_result(temp_dir.path(), "notes.csv", "Matches number,Total time (ms)\n1,1\n"),
        ];

        assert!(matches!(
            aggregate(&files),
            Err(AggregateError::MalformedFileName(_))
        ));
    }

    #[test]
    fn test_aggregate_fixture_directory() {
        let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/MP8_MP9_results");
        let config = ScanConfig {
            sort_by_name: true,
            ..ScanConfig::default()
        };
        let files = ResultScanner::new(fixtures, config).scan().unwrap();
        let rows = aggregate(&files).unwrap();

        let records: Vec<_> = rows.iter().map(SummaryRow::to_record).collect();
        assert_eq!(
            records,
            vec![
                ["AKAZE", "AKAZE", "139.0", "95.17"],
                ["FAST", "BRIEF", "122.0", "2.11"],
                ["SHITOMASI", "ORB", "100.5", "13.13"],
            ]
        );
    }
}
