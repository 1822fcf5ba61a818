//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `cdn_check` library that handles:
//! - Command-line argument parsing
//! - Logger initialization
//! - User-facing output formatting
//!
//! All core functionality is implemented in the library crate.

use anyhow::{Context, Result};
use clap::Parser;
use std::process;

use cdn_check::initialization::init_logger_with;
use cdn_check::{run_check, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments into Config
    let config = Config::parse();

    // Initialize logger based on config
    let log_level = config.log_level.clone();
    let log_format = config.log_format.clone();
    init_logger_with(log_level.into(), log_format).context("Failed to initialize logger")?;

    match run_check(config).await {
        Ok(report) => {
            if report.invalid_targets > 0 {
                eprintln!(
                    "{} of {} targets were invalid and skipped",
                    report.invalid_targets, report.total_targets
                );
            }
            Ok(())
        }
        Err(e) => {
            eprintln!("cdn_check error: {:#}", e);
            process::exit(1);
        }
    }
}
