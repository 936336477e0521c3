//! Logging setup: console output plus an optional side file.
//!
//! The filter comes from `RUST_LOG` when it is set and valid; otherwise the
//! configured level is used, and `info` if that does not parse either.  Both
//! outputs share one filter.  The file is opened in append mode and written
//! without ANSI colour codes.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use thiserror::Error;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Level used when neither `RUST_LOG` nor the configured level is usable.
pub const FALLBACK_LEVEL: &str = "info";

/// Error type for logging setup.
#[derive(Debug, Error)]
pub enum LoggingError {
    /// The side file could not be opened for appending.
    #[error("failed to open log file {path}: {source}")]
    OpenFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// A global subscriber was already installed.
    #[error("logging already initialised: {0}")]
    AlreadyInitialized(#[from] TryInitError),
}

/// Builds the shared filter.
pub fn build_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new(FALLBACK_LEVEL))
}

/// Opens `path` for appending, creating it if needed.
///
/// # Errors
///
/// Returns [`LoggingError::OpenFile`] if the file cannot be opened.
pub fn open_log_file(path: &Path) -> Result<File, LoggingError> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| LoggingError::OpenFile {
            path: path.to_path_buf(),
            source,
        })
}

/// Installs the global subscriber.
///
/// # Errors
///
/// Returns [`LoggingError::OpenFile`] if `file` cannot be opened, or
/// [`LoggingError::AlreadyInitialized`] if called twice.
pub fn init_logging(level: &str, file: Option<&Path>) -> Result<(), LoggingError> {
    let file_layer = match file {
        Some(path) => Some(
            fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(open_log_file(path)?)),
        ),
        None => None,
    };

    tracing_subscriber::registry()
        .with(build_filter(level))
        .with(fmt::layer())
        .with(file_layer)
        .try_init()?;
    Ok(())
}
