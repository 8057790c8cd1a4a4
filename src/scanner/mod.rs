//! Result file scanner.
//!
//! Walks the results directory and yields every regular file in it,
//! recursively, in traversal order unless sorting is requested.

use crate::error::AggregateError;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Configuration for result file scanning.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Sort entries by file name instead of using raw traversal order.
    pub sort_by_name: bool,
    /// Include dot-files such as `.DS_Store`.
    pub include_hidden: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            sort_by_name: false,
            include_hidden: true,
        }
    }
}

impl From<&crate::config::ScannerConfig> for ScanConfig {
    fn from(config: &crate::config::ScannerConfig) -> Self {
        Self {
            sort_by_name: config.sort_by_name,
            include_hidden: config.include_hidden,
        }
    }
}

/// A discovered result file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedFile {
    /// Full path to the file.
    pub path: PathBuf,
    /// Bare file name, the part the combination key is parsed from.
    pub file_name: String,
    /// File size in bytes
    pub size: u64,
}

/// Scanner over a results directory.
pub struct ResultScanner {
    config: ScanConfig,
    results_dir: PathBuf,
}

impl ResultScanner {
    /// Create a new scanner rooted at `results_dir`.
    pub fn new(results_dir: PathBuf, config: ScanConfig) -> Self {
        Self {
            config,
            results_dir,
        }
    }

    pub fn results_dir(&self) -> &Path {
        &self.results_dir
    }

    /// Scan for all result files.
    ///
    /// A missing results directory yields no files rather than an error.
    pub fn scan(&self) -> Result<Vec<ScannedFile>, AggregateError> {
        if !self.results_dir.is_dir() {
            warn!(
                "Results directory {} does not exist or is not a directory",
                self.results_dir.display()
            );
            return Ok(Vec::new());
        }

        let mut walker = WalkDir::new(&self.results_dir).min_depth(1);
        if self.config.sort_by_name {
            walker = walker.sort_by_file_name();
        }

        let include_hidden = self.config.include_hidden;
        let entries = walker
            .into_iter()
            .filter_entry(|entry| {
                entry.depth() == 0 || include_hidden || !is_hidden(entry.file_name().to_str())
            });

        let mut files = Vec::new();
        for entry in entries {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }

            let file_name = entry.file_name().to_string_lossy().to_string();
            let size = entry.metadata().map(|m| m.len()).unwrap_or(0);
            debug!("Found result file {} ({} bytes)", entry.path().display(), size);

            files.push(ScannedFile {
                path: entry.into_path(),
                file_name,
                size,
            });
        }

        Ok(files)
    }
}

fn is_hidden(name: Option<&str>) -> bool {
    name.map(|n| n.starts_with('.')).unwrap_or(false)
}
