//! Data models for benchmark aggregation.
//!
//! This module contains the core data structures: the combination key
//! parsed from a result file name, the per-file summary row and the
//! complete report handed to the writers.

use crate::error::AggregateError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Header row of the CSV summary.
pub const SUMMARY_HEADER: [&str; 4] = [
    "Detector type",
    "Descriptor type",
    "Average matches",
    "Average time",
];

/// Column holding the number of matched keypoints per trial.
pub const MATCHES_COLUMN: &str = "Matches number";

/// Column holding detector plus descriptor time per trial.
pub const TOTAL_TIME_COLUMN: &str = "Total time (ms)";

/// Detector/descriptor pair encoded in a result file name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Combination {
    /// Keypoint detector (e.g. `FAST`).
    pub detector: String,
    /// Feature descriptor (e.g. `BRIEF`).
    pub descriptor: String,
    /// Whatever follows the descriptor, extension stripped
    /// (e.g. `MAT_BF_SEL_KNN`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variant: Option<String>,
}

impl Combination {
    /// Parse `{detector}_{descriptor}_...` from a bare file name.
    ///
    /// Only the first two `_`-separated segments are significant. A name
    /// with no `_` at all is rejected.
    pub fn from_file_name(file_name: &str) -> Result<Self, AggregateError> {
        let mut segments = file_name.splitn(3, '_');

        let detector = segments.next().unwrap_or_default();
        let descriptor = segments
            .next()
            .ok_or_else(|| AggregateError::MalformedFileName(file_name.to_string()))?;

        // A two-segment name keeps its extension on the descriptor, the
        // same way a plain split would.
        let variant = segments
            .next()
            .map(|rest| match Path::new(rest).file_stem() {
                Some(stem) => stem.to_string_lossy().to_string(),
                None => rest.to_string(),
            })
            .filter(|rest| !rest.is_empty());

        Ok(Self {
            detector: detector.to_string(),
            descriptor: descriptor.to_string(),
            variant,
        })
    }
}

impl fmt::Display for Combination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.detector, self.descriptor)
    }
}

/// Averages computed from one result file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRow {
    /// Combination parsed from the file name.
    #[serde(flatten)]
    pub combination: Combination,
    /// Result file the row was computed from.
    pub source: PathBuf,
    /// Number of data rows in the file.
    pub trials: usize,
    /// Mean of the `Matches number` column.
    pub average_matches: f64,
    /// Mean of the `Total time (ms)` column, in milliseconds.
    pub average_time_ms: f64,
}

impl SummaryRow {
    /// Average matches as written to the summary: a real number with no
    /// fixed precision, always carrying a fractional part (`15.0`).
    pub fn average_matches_display(&self) -> String {
        format_real(self.average_matches)
    }

    /// Average time as written to the summary: fixed-point, two decimals.
    pub fn average_time_display(&self) -> String {
        format!("{:.2}", self.average_time_ms)
    }

    /// The four fields of a CSV summary record.
    pub fn to_record(&self) -> [String; 4] {
        [
            self.combination.detector.clone(),
            self.combination.descriptor.clone(),
            self.average_matches_display(),
            self.average_time_display(),
        ]
    }
}

/// Format a float with the shortest round-trip digits, keeping `.0` on
/// whole numbers.
///
/// Decimal exponents below -4 or from 16 up switch to exponent form with a
/// signed, at least two-digit exponent (`1e+16`, `3.3333333333333335e-05`).
pub fn format_real(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }

    let scientific = format!("{:e}", value);
    let (mantissa, exponent) = match scientific.split_once('e') {
        Some((m, e)) => (m, e.parse::<i32>().unwrap_or(0)),
        None => (scientific.as_str(), 0),
    };

    if (-4..16).contains(&exponent) {
        let text = value.to_string();
        if text.contains('.') {
            text
        } else {
            format!("{}.0", text)
        }
    } else {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!("{}e{}{:02}", mantissa, sign, exponent.abs())
    }
}

/// Metadata about a summary run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// Directory the result files were read from.
    pub results_dir: PathBuf,
    /// Date and time the summary was generated.
    pub generated_at: DateTime<Utc>,
    /// Number of result files aggregated.
    pub files_aggregated: usize,
    /// Total trials across all files.
    pub total_trials: usize,
}

/// The complete summary handed to the report writers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryReport {
    pub metadata: ReportMetadata,
    pub rows: Vec<SummaryRow>,
}

impl SummaryReport {
    /// Build a report for `rows` read from `results_dir`, stamped now.
    pub fn new(results_dir: PathBuf, rows: Vec<SummaryRow>) -> Self {
        let metadata = ReportMetadata {
            results_dir,
            generated_at: Utc::now(),
            files_aggregated: rows.len(),
            total_trials: rows.iter().map(|r| r.trials).sum(),
        };

        Self { metadata, rows }
    }
}
