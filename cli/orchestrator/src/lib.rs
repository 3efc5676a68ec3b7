#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]
//! Command-line front end of the orbit pipeline.
//!
//! Every subcommand returns an [`Outcome`]: success, or failure with an
//! itemized summary already printed. Errors that stop a command before it
//! can report anything are [`CliError`]s.

pub mod args;
pub mod commands;

use thiserror::Error;

pub use args::{Cli, Command};
pub use commands::{run, Outcome};

/// Errors that stop a command.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration could not be loaded
    #[error(transparent)]
    Config(#[from] config::ConfigError),
    /// Logging could not be installed
    #[error(transparent)]
    Logging(#[from] logging::LoggingError),
    /// The pipeline stopped
    #[error(transparent)]
    Pipeline(#[from] pipeline::PipelineError),
    /// A test tier could not run
    #[error(transparent)]
    Testgen(#[from] testgen::TestgenError),
    /// The mock server failed
    #[error(transparent)]
    Mock(#[from] mock::MockError),
    /// The snapshot could not be frozen
    #[error(transparent)]
    Schema(#[from] schema::SchemaError),
    /// I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// Invalid arguments
    #[error("{0}")]
    Message(String),
}

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;
