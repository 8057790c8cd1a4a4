//! Summary report generation.
//!
//! The CSV summary is the primary output. JSON and Markdown renderings of
//! the same rows carry the extra per-file details (variant, source, trials).

use crate::cli::OutputFormat;
use crate::models::{ReportMetadata, SummaryReport, SummaryRow, SUMMARY_HEADER};
use anyhow::{Context, Result};
use serde::Serialize;
use std::io::Write;
use std::path::Path;

/// Write the CSV summary: header, then one record per row, in order.
pub fn write_csv_summary<W: Write>(rows: &[SummaryRow], writer: W) -> Result<()> {
    let mut writer = csv::Writer::from_writer(writer);

    writer.write_record(SUMMARY_HEADER)?;
    for row in rows {
        writer.write_record(row.to_record())?;
    }
    writer.flush()?;

    Ok(())
}

/// Generate the CSV summary as a string.
pub fn generate_csv_report(report: &SummaryReport) -> Result<String> {
    let mut buffer = Vec::new();
    write_csv_summary(&report.rows, &mut buffer)?;
    String::from_utf8(buffer).context("CSV summary is not valid UTF-8")
}

#[derive(Serialize)]
struct JsonRow<'a> {
    #[serde(flatten)]
    row: &'a SummaryRow,
    /// Two-decimal rendering, as written to the CSV.
    average_time: String,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    metadata: &'a ReportMetadata,
    rows: Vec<JsonRow<'a>>,
}

/// Generate a JSON report.
pub fn generate_json_report(report: &SummaryReport) -> Result<String> {
    let json = JsonReport {
        metadata: &report.metadata,
        rows: report
            .rows
            .iter()
            .map(|row| JsonRow {
                row,
                average_time: row.average_time_display(),
            })
            .collect(),
    };

    serde_json::to_string_pretty(&json).map_err(Into::into)
}

/// Generate a Markdown report.
pub fn generate_markdown_report(report: &SummaryReport) -> String {
    let mut output = String::new();

    output.push_str("# Detector / Descriptor Benchmark Summary\n\n");
    output.push_str(&generate_metadata_section(&report.metadata));
    output.push_str(&generate_rows_section(&report.rows));

    output
}

fn generate_metadata_section(metadata: &ReportMetadata) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!(
        "- **Results Directory:** `{}`\n",
        metadata.results_dir.display()
    ));
    section.push_str(&format!(
        "- **Generated:** {}\n",
        metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!(
        "- **Result Files:** {}\n",
        metadata.files_aggregated
    ));
    section.push_str(&format!("- **Total Trials:** {}\n", metadata.total_trials));
    section.push('\n');

    section
}

fn generate_rows_section(rows: &[SummaryRow]) -> String {
    let mut section = String::new();

    section.push_str("## Combinations\n\n");

    if rows.is_empty() {
        section.push_str("No result files were found.\n");
        return section;
    }

    section.push_str(
        "| Detector | Descriptor | Variant | Trials | Average matches | Average time (ms) |\n",
    );
    section.push_str("|:---|:---|:---|:---:|---:|---:|\n");

    for row in rows {
        section.push_str(&format!(
            "| {} | {} | {} | {} | {} | {} |\n",
            row.combination.detector,
            row.combination.descriptor,
            row.combination.variant.as_deref().unwrap_or("-"),
            row.trials,
            row.average_matches_display(),
            row.average_time_display()
        ));
    }

    section
}

/// Render `report` in `format` and write it to `path`, replacing any
/// existing file.
pub fn write_report(report: &SummaryReport, format: OutputFormat, path: &Path) -> Result<()> {
    let content = match format {
        OutputFormat::Csv => generate_csv_report(report)?,
        OutputFormat::Json => generate_json_report(report)?,
        OutputFormat::Markdown => generate_markdown_report(report),
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    let mut file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    file.write_all(content.as_bytes())
        .with_context(|| format!("Failed to write report to {}", path.display()))?;

    Ok(())
}
