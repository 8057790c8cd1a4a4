//! Error types for result aggregation.

use std::path::PathBuf;
use thiserror::Error;

/// Failures that abort an aggregation run.
#[derive(Debug, Error)]
pub enum AggregateError {
    /// The file name does not carry `{detector}_{descriptor}`.
    #[error("file name '{0}' does not contain detector and descriptor segments separated by '_'")]
    MalformedFileName(String),

    /// A required column is absent from the header row.
    #[error("{}: missing column '{column}'", path.display())]
    MissingColumn { path: PathBuf, column: String },

    /// The table has a header but no trial rows.
    #[error("{}: no data rows", path.display())]
    EmptyTable { path: PathBuf },

    /// A row ends before reaching a required column.
    #[error("{}: row {row} has no value for column '{column}'", path.display())]
    MissingCell {
        path: PathBuf,
        column: String,
        /// 1-indexed data row (the header row is not counted).
        row: usize,
    },

    /// A cell could not be parsed as the expected number type.
    #[error(
        "{}: row {row}, column '{column}': '{value}' is not a valid number",
        path.display()
    )]
    InvalidNumber {
        path: PathBuf,
        column: String,
        /// 1-indexed data row (the header row is not counted).
        row: usize,
        value: String,
    },

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed CSV in {}: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("failed to traverse results directory: {0}")]
    Walk(#[from] walkdir::Error),
}
