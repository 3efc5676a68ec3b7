#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]

//! Schema analysis for the orbit pipeline
//!
//! Everything that inspects a snapshot or a rendered SDK without generating
//! anything:
//!
//! - [`validator`] checks a snapshot's definitions and examples;
//! - [`regression`] classifies the changes between two snapshots;
//! - [`surface`] audits rendered SDKs for missing methods;
//! - [`differential`] compares JSON values field by field.

pub mod differential;
pub mod regression;
pub mod surface;
pub mod validator;

pub use differential::{compare_values, Difference};
pub use regression::{
    check_regression, diff_snapshots, Acknowledgement, BreakingChange, ChangeKind, RegressionCheck,
    RegressionReport, RegressionState, SchemaChange, Severity,
};
use registry::Registries;
use schema::{SchemaError, SchemaSnapshot};
pub use surface::{
    audit_surface, check_compatibility, extract_surface, normalize_name, CompatibilityReport,
    ParamMismatch, SurfaceMethod,
};
use thiserror::Error;
pub use validator::{validate_snapshot, SchemaValidator};

/// Errors that stop a run before generation.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// The snapshot does not validate
    #[error("schema has {} problem(s): {}", .0.len(), summarize(.0))]
    Invalid(Vec<SchemaError>),

    /// Unacknowledged breaking changes against the baseline
    #[error(transparent)]
    Breaking(#[from] BreakingChange),

    /// A surface pattern does not compile
    #[error("surface pattern: {0}")]
    Pattern(#[from] regex::Error),
}

fn summarize(errors: &[SchemaError]) -> String {
    errors.iter().map(ToString::to_string).collect::<Vec<_>>().join("; ")
}

/// Result type for analysis operations
pub type Result<T> = std::result::Result<T, AnalysisError>;

/// Outcome of [`analyze`].
#[derive(Debug)]
pub struct Analysis {
    /// Registries of the validated snapshot
    pub registries: Registries,
    /// Regression report, when a baseline was given
    pub regression: Option<RegressionReport>,
}

/// Validate `current` and, with a baseline, run the regression check.
///
/// Fails on any schema problem and on breaking changes that were not
/// acknowledged.
pub fn analyze(
    current: &SchemaSnapshot,
    baseline: Option<&SchemaSnapshot>,
    acknowledge_breaking: bool,
) -> Result<Analysis> {
    let registries = validate_snapshot(current).map_err(AnalysisError::Invalid)?;
    let regression = match baseline {
        Some(previous) => Some(check_regression(previous, current, acknowledge_breaking).into_result()?),
        None => None,
    };
    Ok(Analysis { registries, regression })
}
