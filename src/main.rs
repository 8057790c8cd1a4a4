//! mp9-summary - detector/descriptor benchmark aggregator
//!
//! Reads the per-combination result files written by the camera
//! feature-tracking benchmark and produces one summary table with the
//! average match count and average total time of every file.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Any failure (unreadable directory, malformed file name, bad CSV,
//!       non-numeric cell, write failure)

mod analysis;
mod cli;
mod config;
mod error;
mod models;
mod report;
mod scanner;

use anyhow::{Context, Result};
use cli::Args;
use config::{Config, DEFAULT_CONFIG_FILE};
use models::{Combination, SummaryReport};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

fn main() -> Result<()> {
    let args = Args::parse_args();

    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    if args.init_config {
        return handle_init_config();
    }

    init_logging(&args);

    info!("mp9-summary v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    if let Err(e) = run(&args) {
        error!("Summary failed: {:#}", e);
        eprintln!("\n❌ Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// Handle --init-config: generate a default .mp9-summary.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(DEFAULT_CONFIG_FILE);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            DEFAULT_CONFIG_FILE
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", DEFAULT_CONFIG_FILE))?;

    println!("✅ Created {} with default settings.", DEFAULT_CONFIG_FILE);
    println!("   Edit it to change the results directory, output path and format.");
    Ok(())
}

/// Log to stderr so stdout carries only the progress lines.
fn init_logging(args: &Args) {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(args.log_level())
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// Scan, aggregate and write the summary.
fn run(args: &Args) -> Result<()> {
    let start_time = Instant::now();

    let mut config = load_config(args)?;
    config.merge_with_args(args);

    let scan_config = scanner::ScanConfig::from(&config.scanner);
    let file_scanner =
        scanner::ResultScanner::new(config.scanner.results_dir.clone(), scan_config);

    if args.dry_run {
        return handle_dry_run(&file_scanner);
    }

    if !args.quiet {
        println!(
            "📂 Reading results from {}",
            file_scanner.results_dir().display()
        );
    }

    let files = file_scanner.scan()?;
    info!("Found {} result files", files.len());

    // Every file is read before anything is written, so a failure here
    // leaves the previous summary untouched.
    let rows = analysis::aggregate(&files)?;

    let report = SummaryReport::new(config.scanner.results_dir.clone(), rows);
    report::write_report(&report, config.general.format, &config.general.output)?;

    if !args.quiet {
        println!("\n📊 Summary:");
        println!("   Result files: {}", report.metadata.files_aggregated);
        println!("   Total trials: {}", report.metadata.total_trials);
        println!("   Duration: {:.2}s", start_time.elapsed().as_secs_f64());
        println!(
            "\n✅ Summary saved to: {}",
            config.general.output.display()
        );
    }

    Ok(())
}

/// Handle --dry-run: list result files and their combinations, write nothing.
fn handle_dry_run(file_scanner: &scanner::ResultScanner) -> Result<()> {
    println!(
        "\n🔍 Dry run: scanning {} (nothing is written)...\n",
        file_scanner.results_dir().display()
    );

    let files = file_scanner.scan()?;

    if files.is_empty() {
        println!("   No result files found.");
    } else {
        println!("   Found {} files that would be aggregated:\n", files.len());
        for file in &files {
            match Combination::from_file_name(&file.file_name) {
                Ok(combination) => println!(
                    "     📄 {} -> {} ({} bytes)",
                    file.path.display(),
                    combination,
                    file.size
                ),
                Err(e) => println!("     ⚠️  {} -> {}", file.path.display(), e),
            }
        }
        println!("\n   Total: {} files", files.len());
    }

    println!("\n✅ Dry run complete.");
    Ok(())
}

/// An explicit `--config` must load; a broken default file only warns.
fn load_config(args: &Args) -> Result<Config> {
    if let Some(ref path) = args.config {
        info!("Using config {}", path.display());
        return Config::load(path);
    }

    let config = Config::load_default().unwrap_or_else(|e| {
        warn!("Ignoring {}: {:#}", DEFAULT_CONFIG_FILE, e);
        None
    });
    if config.is_none() {
        debug!("No {} found, using defaults", DEFAULT_CONFIG_FILE);
    }

    Ok(config.unwrap_or_default())
}
