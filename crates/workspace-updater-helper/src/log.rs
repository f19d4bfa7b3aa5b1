//! Logging for the update helper.
//!
//! The helper has no console of its own when started by the launcher, so
//! every run also writes a timestamped log file to the temp directory.

use std::fs::{File, OpenOptions};
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;

use chrono::{DateTime, Local};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Directory the helper writes its log files to.
pub fn log_dir() -> PathBuf {
    std::env::temp_dir()
}

/// Log file name for a run started at `started`.
pub fn log_file_name(started: DateTime<Local>) -> String {
    format!("workspace-updater-{}.log", started.format("%Y%m%d_%H%M%S"))
}

fn open_log_file() -> io::Result<(File, PathBuf)> {
    let path = log_dir().join(log_file_name(Local::now()));
    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(&path)?;
    Ok((file, path))
}

/// Install the global subscriber: stderr plus the log file when it can be created.
///
/// Returns the log file path, if any.
pub fn init_logging() -> Option<PathBuf> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let stderr = fmt::layer().with_writer(io::stderr).with_target(false);

    match open_log_file() {
        Ok((file, path)) => {
            let file_layer = fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .with_target(false);
            tracing_subscriber::registry()
                .with(filter)
                .with(stderr)
                .with(file_layer)
                .init();
            Some(path)
        }
        Err(error) => {
            tracing_subscriber::registry()
                .with(filter)
                .with(stderr)
                .init();
            tracing::warn!("Could not create log file, logging to stderr only: {error}");
            None
        }
    }
}
