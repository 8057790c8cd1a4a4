//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// mp9-summary - detector/descriptor benchmark aggregator
///
/// Reads every per-combination result file under the results directory
/// and writes one summary row per file with its average match count and
/// average total time.
///
/// Examples:
///   mp9-summary
///   mp9-summary --results-dir ../results/MP8_MP9_results --output summary.csv
///   mp9-summary --format markdown --output summary.md --sort
///   mp9-summary --dry-run
///   mp9-summary --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Directory holding the per-combination result files
    ///
    /// Scanned recursively. Default: results/MP8_MP9_results
    #[arg(short, long, value_name = "DIR", env = "MP9_RESULTS_DIR")]
    pub results_dir: Option<PathBuf>,

    /// Output file path for the summary
    ///
    /// Default: results/MP9_results.csv
    #[arg(short, long, value_name = "FILE", env = "MP9_OUTPUT")]
    pub output: Option<PathBuf>,

    /// Output format (csv, json, markdown)
    #[arg(long, value_name = "FORMAT")]
    pub format: Option<OutputFormat>,

    /// Visit result files in file name order instead of directory order
    #[arg(long)]
    pub sort: bool,

    /// Path to configuration file
    ///
    /// If not specified, looks for .mp9-summary.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Dry run: list the result files that would be aggregated
    ///
    /// Nothing is written.
    #[arg(long)]
    pub dry_run: bool,

    /// Generate a default .mp9-summary.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the summary.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Comma-separated summary (default)
    #[default]
    Csv,
    /// JSON format
    Json,
    /// Markdown format
    Markdown,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Reject flag combinations and paths that cannot work.
    ///
    /// A results directory that does not exist is fine (empty summary); one
    /// that exists as a plain file is not.
    pub fn validate(&self) -> Result<(), String> {
        if self.init_config {
            return Ok(());
        }

        if self.verbose && self.quiet {
            return Err("--verbose and --quiet are mutually exclusive".to_string());
        }

        match (&self.results_dir, &self.output) {
            (Some(dir), _) if dir.exists() && !dir.is_dir() => {
                Err(format!("Results path is not a directory: {}", dir.display()))
            }
            (_, Some(output)) if output.is_dir() => {
                Err(format!("Output path is a directory: {}", output.display()))
            }
            _ => Ok(()),
        }
    }

    /// `--quiet` wins over `--verbose`; `validate` rejects the pair anyway.
    pub fn log_level(&self) -> tracing::Level {
        match (self.quiet, self.verbose) {
            (true, _) => tracing::Level::ERROR,
            (false, true) => tracing::Level::DEBUG,
            (false, false) => tracing::Level::INFO,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_args() -> Args {
        Args {
            results_dir: None,
            output: None,
            format: None,
            sort: false,
            config: None,
            verbose: false,
            quiet: false,
            dry_run: false,
            init_config: false,
        }
    }

    #[test]
    fn test_parse_defaults() {
        let args = Args::try_parse_from(["mp9-summary"]).unwrap();
        assert_eq!(args.format, None);
        assert!(!args.sort);
        assert!(!args.dry_run);
    }

    #[test]
    fn test_parse_flags() {
        let args = Args::try_parse_from([
            "mp9-summary",
            "--results-dir",
            "data",
            "-o",
            "out.md",
            "--format",
            "markdown",
            "--sort",
        ])
        .unwrap();
        assert_eq!(args.results_dir, Some(PathBuf::from("data")));
        assert_eq!(args.output, Some(PathBuf::from("out.md")));
        assert_eq!(args.format, Some(OutputFormat::Markdown));
        assert!(args.sort);
    }

    #[test]
    fn test_validation_conflicting_options() {
        let mut args = make_args();
        args.verbose = true;
        args.quiet = true;
        assert!(args.validate().is_err());

        args.init_config = true;
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_validation_output_is_directory() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let mut args = make_args();
        args.output = Some(temp_dir.path().to_path_buf());
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_log_level() {
        for (quiet, verbose, level) in [
            (false, false, tracing::Level::INFO),
            (false, true, tracing::Level::DEBUG),
            (true, false, tracing::Level::ERROR),
        ] {
            let args = Args {
                quiet,
                verbose,
                ..make_args()
            };
            assert_eq!(args.log_level(), level);
        }
    }

    #[test]
    fn test_validation_results_path_is_file() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let file = temp_dir.path().join("FAST_BRIEF.csv");
        std::fs::write(&file, "").unwrap();

        let mut args = make_args();
        args.results_dir = Some(file);
        assert!(args.validate().is_err());

        args.results_dir = Some(temp_dir.path().join("absent"));
        assert!(args.validate().is_ok());
    }
}
