#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]

//! Logging setup for the compiler.
//!
//! Library crates log through `tracing` macros only; binaries call [`init`]
//! once to install a fmt subscriber. `RUST_LOG` overrides the configured level.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use thiserror::Error;
use tracing_subscriber::EnvFilter;

/// Errors raised while installing the subscriber.
#[derive(Debug, Error)]
pub enum LoggingError {
    /// The level string is not a valid filter directive
    #[error("invalid log level `{0}`")]
    InvalidLevel(String),

    /// The log file could not be opened
    #[error("cannot open log file {path}: {source}")]
    File {
        /// Log file path
        path: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

/// Build the filter: `RUST_LOG` if set and valid, otherwise `level`.
pub fn filter(level: &str) -> Result<EnvFilter, LoggingError> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    EnvFilter::try_new(level).map_err(|_| LoggingError::InvalidLevel(level.to_string()))
}

/// Install the global subscriber, writing to `file` when given, stderr otherwise.
///
/// A second call is a no-op; the first subscriber stays installed.
pub fn init(level: &str, file: Option<&Path>) -> Result<(), LoggingError> {
    let filter = filter(level)?;
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(false);

    // try_init fails only when a subscriber is already set.
    let _ = match file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path).map_err(|source| {
                LoggingError::File { path: path.display().to_string(), source }
            })?;
            builder.with_writer(Mutex::new(file)).with_ansi(false).try_init()
        }
        None => builder.with_writer(std::io::stderr).try_init(),
    };
    Ok(())
}

/// Emits a trace-level event tagged with its module.
pub fn trace(module: &str, msg: &str) {
    tracing::trace!(module = module, "{}", msg);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_level_is_rejected() {
        if std::env::var_os("RUST_LOG").is_some() {
            return;
        }
        assert!(matches!(filter("orbit=loud"), Err(LoggingError::InvalidLevel(_))));
        assert!(filter("debug").is_ok());
    }

    #[test]
    fn test_init_with_file_is_idempotent() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("orbit.log");
        init("info", Some(&path)).expect("first init");
        init("info", Some(&path)).expect("second init");
        tracing::info!("hello");
        assert!(path.exists());
    }

    #[test]
    fn test_unwritable_log_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("missing/dir/orbit.log");
        assert!(matches!(init("info", Some(&path)), Err(LoggingError::File { .. })));
    }
}
