//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.mp9-summary.toml` files.

use crate::cli::OutputFormat;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File name looked up in the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = ".mp9-summary.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Scanner settings.
    #[serde(default)]
    pub scanner: ScannerConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Summary output path.
    #[serde(default = "default_output")]
    pub output: PathBuf,

    /// Summary output format.
    #[serde(default)]
    pub format: OutputFormat,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            output: default_output(),
            format: OutputFormat::default(),
        }
    }
}

fn default_output() -> PathBuf {
    PathBuf::from("results/MP9_results.csv")
}

/// Result file scanner settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScannerConfig {
    /// Directory holding the per-combination result files.
    #[serde(default = "default_results_dir")]
    pub results_dir: PathBuf,

    /// Visit files in name order.
    #[serde(default)]
    pub sort_by_name: bool,

    /// Include dot-files.
    #[serde(default = "default_true")]
    pub include_hidden: bool,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            results_dir: default_results_dir(),
            sort_by_name: false,
            include_hidden: true,
        }
    }
}

fn default_results_dir() -> PathBuf {
    PathBuf::from("results/MP8_MP9_results")
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(DEFAULT_CONFIG_FILE);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings, but only
    /// when they were actually given.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref results_dir) = args.results_dir {
            self.scanner.results_dir = results_dir.clone();
        }
        if let Some(ref output) = args.output {
            self.general.output = output.clone();
        }
        if let Some(format) = args.format {
            self.general.format = format;
        }

        // --sort can only switch sorting on
        if args.sort {
            self.scanner.sort_by_name = true;
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Args;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.scanner.results_dir, PathBuf::from("results/MP8_MP9_results"));
        assert_eq!(config.general.output, PathBuf::from("results/MP9_results.csv"));
        assert_eq!(config.general.format, OutputFormat::Csv);
        assert!(config.scanner.include_hidden);
        assert!(!config.scanner.sort_by_name);
    }

    #[test]
    fn test_parse_config() {
        let toml_content = r#"
[general]
output = "summary.md"
format = "markdown"

[scanner]
results_dir = "../results/MP8_MP9_results"
sort_by_name = true
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert_eq!(config.general.output, PathBuf::from("summary.md"));
        assert_eq!(config.general.format, OutputFormat::Markdown);
        assert_eq!(
            config.scanner.results_dir,
            PathBuf::from("../results/MP8_MP9_results")
        );
        assert!(config.scanner.sort_by_name);
        assert!(config.scanner.include_hidden);
    }

    #[test]
    fn test_merge_cli_overrides_config() {
        let mut config: Config = toml::from_str(
            r#"
[general]
output = "from_config.csv"

[scanner]
results_dir = "config_dir"
"#,
        )
        .unwrap();

        // Built directly so MP9_* variables in the environment cannot leak in
        let args = Args {
            results_dir: None,
            output: Some(PathBuf::from("from_cli.json")),
            format: Some(OutputFormat::Json),
            sort: false,
            config: None,
            verbose: false,
            quiet: false,
            dry_run: false,
            init_config: false,
        };
        config.merge_with_args(&args);

        assert_eq!(config.general.output, PathBuf::from("from_cli.json"));
        assert_eq!(config.general.format, OutputFormat::Json);
        assert_eq!(config.scanner.results_dir, PathBuf::from("config_dir"));
    }

    #[test]
    fn test_load_missing_file() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        assert!(Config::load(&temp_dir.path().join("absent.toml")).is_err());
    }

    #[test]
    fn test_default_toml_roundtrip() {
        let toml_str = Config::default_toml();
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[scanner]"));

        let config: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(config.general.output, PathBuf::from("results/MP9_results.csv"));
    }
}
