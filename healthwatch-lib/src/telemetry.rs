//! Logging initialization for the monitor.
//!
//! The primary health log is an append-only, line-oriented file written
//! through `tracing`. Initialization returns a guard that flushes the file
//! handle on drop; the caller holds it for the whole run, including early
//! failure paths.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

/// Primary health log file name within the log directory.
pub const PRIMARY_LOG: &str = "healthwatch.log";
/// Alert log file name within the log directory.
pub const ALERT_LOG: &str = "alerts.log";
/// Run lock file name within the log directory.
pub const LOCK_FILE: &str = "healthwatch.lock";

/// Telemetry initialization errors. These abort the run: a monitor that
/// cannot write its log has no durable output at all.
#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("failed to create log directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to open log file {path}: {source}")]
    OpenLog {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to install tracing subscriber: {0}")]
    Subscriber(String),
}

/// Holds the primary log handle; flushes it when dropped.
#[derive(Debug)]
pub struct LogGuard {
    file: Arc<File>,
}

impl Drop for LogGuard {
    fn drop(&mut self) {
        let _ = (&*self.file).flush();
    }
}

/// Initialize the global tracing subscriber writing to the primary log.
///
/// The level comes from `level` unless the `HEALTHWATCH_LOG` environment
/// variable supplies a full filter directive.
pub fn init(dir: &Path, level: &str) -> Result<LogGuard, TelemetryError> {
    std::fs::create_dir_all(dir).map_err(|source| TelemetryError::CreateDir {
        path: dir.to_path_buf(),
        source,
    })?;

    let path = dir.join(PRIMARY_LOG);
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .map_err(|source| TelemetryError::OpenLog {
            path: path.clone(),
            source,
        })?;
    let file = Arc::new(file);

    let filter = EnvFilter::try_from_env("HEALTHWATCH_LOG")
        .unwrap_or_else(|_| EnvFilter::new(level.to_owned()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Arc::clone(&file))
        .with_ansi(false)
        .with_target(false)
        .try_init()
        .map_err(|err| TelemetryError::Subscriber(err.to_string()))?;

    Ok(LogGuard { file })
}
