//! Logging setup for check runs.
//!
//! Probe failures are expected and counted, so per-query chatter stays at
//! debug level and the resolver libraries are kept quiet unless something is
//! actually wrong.

use std::io::Write;

use crate::config::LogFormat;
use crate::error_handling::InitializationError;
use colored::*;
use log::{Level, LevelFilter};

/// Installs the global `env_logger` for a check run.
///
/// `RUST_LOG` is read first so per-module directives still apply, then `level`
/// replaces the default filter and the `cdn_check` targets. `hickory_proto`
/// only reports errors (malformed answers are already tallied by the probe
/// engine) and `hickory_resolver` only warnings.
///
/// `LogFormat::Plain` writes `marker time target [LEVEL] message` lines;
/// `LogFormat::Json` writes one object per line with a millisecond UTC
/// timestamp, for piping into log collectors.
///
/// ```bash
/// cdn_check -t example.com --log-level debug
/// RUST_LOG=cdn_check::dns=trace cdn_check -t example.com -C
/// ```
///
/// # Errors
///
/// `InitializationError::LoggerError` when a logger is already installed.
pub fn init_logger_with(level: LevelFilter, format: LogFormat) -> Result<(), InitializationError> {
    colored::control::set_override(true);

    let mut builder = env_logger::Builder::from_default_env();
    builder
        .filter_level(level)
        .filter_module("hickory_proto", LevelFilter::Error)
        .filter_module("hickory_resolver", LevelFilter::Warn)
        .filter_module("cdn_check", level);

    match format {
        LogFormat::Json => {
            builder.format(|buf, record| {
                let msg = serde_json::to_string(&record.args().to_string())
                    .unwrap_or_else(|_| "\"\"".into());
                writeln!(
                    buf,
                    "{{\"ts\":{},\"level\":\"{}\",\"target\":\"{}\",\"msg\":{}}}",
                    chrono::Utc::now().timestamp_millis(),
                    record.level(),
                    record.target(),
                    msg
                )
            });
        }
        LogFormat::Plain => {
            builder.format(|buf, record| {
                writeln!(
                    buf,
                    "{} {} {} [{}] {}",
                    level_marker(record.level()),
                    chrono::Local::now().format("%H:%M:%S%.3f").to_string().dimmed(),
                    record.target().cyan(),
                    colored_level(record.level()),
                    record.args()
                )
            });
        }
    }

    builder.try_init().map_err(InitializationError::from)?;

    Ok(())
}

fn colored_level(level: Level) -> ColoredString {
    let label = level.to_string();
    match level {
        Level::Error => label.red(),
        Level::Warn => label.yellow(),
        Level::Info => label.green(),
        Level::Debug => label.blue(),
        Level::Trace => label.purple(),
    }
}

fn level_marker(level: Level) -> &'static str {
    match level {
        Level::Error => "❌",
        Level::Warn => "⚠️",
        Level::Info => "✔️",
        Level::Debug => "🔍",
        Level::Trace => "🔬",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_markers_are_distinct() {
        let levels = [
            Level::Error,
            Level::Warn,
            Level::Info,
            Level::Debug,
            Level::Trace,
        ];
        let mut markers: Vec<&str> = levels.iter().map(|l| level_marker(*l)).collect();
        markers.sort_unstable();
        markers.dedup();
        assert_eq!(markers.len(), levels.len());
    }

    #[test]
    fn test_init_logger_formats_do_not_panic() {
        // env_logger can only be installed once per process, so later calls fail
        let _ = init_logger_with(LevelFilter::Info, LogFormat::Plain);
        let second = init_logger_with(LevelFilter::Debug, LogFormat::Json);
        assert!(second.is_err(), "a second logger must be rejected");
    }
}
