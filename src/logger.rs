//! Logging support
//!
//! Logs go to stderr by default so they never mix with diff output on stdout.
//! With `--log-file` they are appended to that file instead. The
//! `REPLACE_LOG` environment variable overrides the level chosen by `-v`.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::{fmt, prelude::*, registry, EnvFilter};

/// Environment variable holding an `EnvFilter` directive
pub const LOG_ENV: &str = "REPLACE_LOG";

/// Default filter directive for a `-v` count
pub fn level_for_verbosity(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

fn build_filter(verbosity: u8) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(level_for_verbosity(verbosity)))
}

/// Initialize the logging system
///
/// Returns the log file path when logging to a file. If the file cannot be
/// opened, a warning is printed and logging falls back to stderr.
pub fn init_logging(verbosity: u8, log_file: Option<&Path>) -> Result<Option<PathBuf>> {
    if let Some(path) = log_file {
        match open_log_file(path) {
            Ok(file) => {
                let subscriber = registry()
                    .with(
                        fmt::layer()
                            .with_writer(Mutex::new(file))
                            .with_ansi(false)
                            .with_target(false),
                    )
                    .with(build_filter(verbosity));

                tracing::subscriber::set_global_default(subscriber)
                    .map_err(|e| anyhow::anyhow!("Failed to set tracing subscriber: {}", e))?;

                return Ok(Some(path.to_path_buf()));
            }
            Err(e) => {
                eprintln!("Warning: Could not open log file: {:#}", e);
            }
        }
    }

    let subscriber = registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(atty::is(atty::Stream::Stderr))
                .with_target(false)
                .without_time(),
        )
        .with(build_filter(verbosity));

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("Failed to set tracing subscriber: {}", e))?;

    Ok(None)
}

fn open_log_file(path: &Path) -> Result<fs::File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create log directory: {}", parent.display()))?;
    }

    fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file: {}", path.display()))
}
