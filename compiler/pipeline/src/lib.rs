#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]

//! High-level pipeline that turns a schema snapshot into SDKs, tests, a
//! mock route table and an OpenAPI document.
//!
//! ## Module Organization
//!
//! - `options` - Run options and their builder
//! - `orchestration` - Entry points (`validate`, `generate`)
//! - `staging` - Write-then-rename installation of artifacts
//! - `report` - Per-target outcome of a run
//!
//! Schema problems and unacknowledged breaking changes stop a run before
//! anything is written. After that, each target is generated on its own
//! thread; a failing target is recorded in the [`RunReport`] and leaves its
//! previous artifacts untouched.

use codegen::MockMismatch;
use thiserror::Error;

/// Convenient result type for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Errors that stop a run for every target.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Invalid options.
    #[error("{0}")]
    Message(String),
    /// The snapshot could not be loaded or frozen.
    #[error(transparent)]
    Schema(#[from] schema::SchemaError),
    /// Validation or regression checking failed.
    #[error(transparent)]
    Analysis(#[from] analysis::AnalysisError),
    /// The route table would serve something other than the canonical responses.
    #[error("mock route table diverges: {}", .0.iter().map(ToString::to_string).collect::<Vec<_>>().join("; "))]
    MockMismatch(Vec<MockMismatch>),
    /// The route table could not be encoded.
    #[error(transparent)]
    Transport(#[from] transport::TransportError),
    /// JSON encoding error.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    /// I/O error while creating or writing files.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub mod options;
pub mod orchestration;
pub mod report;
pub mod staging;

pub use options::{PipelineOptions, PipelineOptionsBuilder};
pub use orchestration::{generate, generate_target, load_snapshot, prepare_output_dir, validate};
pub use report::{RunReport, TargetOutcome};
