#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]

//! Test generation and the four test tiers.
//!
//! - tier 1 ([`run_contract_tier`]): the validators over every definition,
//!   in process;
//! - tier 2 ([`run_unit_tier`]): each target's generated helper tests;
//! - tier 3 ([`run_integration_tier`]): each target's generated endpoint
//!   tests against one mock server;
//! - tier 4 ([`run_parity`]): every SDK calls every endpoint against the mock
//!   and must decode the canonical payload. Regression checking, the other
//!   half of tier 4, lives in `analysis`.
//!
//! Generated suites are produced by [`generate_test_artifacts`] next to each
//! SDK. A missing toolchain skips its target instead of failing it.

pub mod contract;
pub mod driver;
pub mod error;
pub mod literal;
pub mod parity;
pub mod report;
pub mod results;
pub mod runner;
pub mod suites;

use codegen::{ArtifactKind, ClientModel, GeneratedArtifact, GenerationContext, GenerationError};
pub use contract::{run_contract_tier, run_regression_tier};
pub use driver::{parse_marker, CommandDriver, DriverOutput, SdkDriver, TransportDriver};
pub use error::{Result, TestgenError};
pub use parity::{
    canonical_payload, run_parity, ParityFailure, ParityFailureKind, ParityReport, ParityRunner,
    ParitySkip,
};
pub use report::{Tier, TierFailure, TierReport};
pub use results::{parse_results, CaseResult, CaseStatus};
pub use runner::{run_command, run_integration_tier, run_unit_tier, CommandOutcome};
pub use suites::{suite_renderer_for, SuiteRenderer};

/// Environment variable carrying the mock base URL to generated tests.
pub const MOCK_URL_ENV: &str = "ORBIT_MOCK_URL";
/// Environment variable naming the endpoint a parity driver calls.
pub const PARITY_ENDPOINT_ENV: &str = "ORBIT_PARITY_ENDPOINT";
/// Environment variable carrying the request fields of a parity call, as JSON.
pub const PARITY_REQUEST_ENV: &str = "ORBIT_PARITY_REQUEST";
/// Prefix of the result line a parity driver prints.
pub const PARITY_MARKER: &str = "ORBIT_PARITY_RESULT ";

/// Render the test suite and the parity driver of `model`'s target.
pub fn generate_test_artifacts(
    ctx: &GenerationContext,
    model: &ClientModel,
) -> std::result::Result<Vec<GeneratedArtifact>, GenerationError> {
    let target = model.target;
    let renderer = suite_renderer_for(target);
    let render_error = |e: std::fmt::Error| GenerationError::Render { target, message: e.to_string() };

    let suite = renderer.render_suite(model).map_err(render_error)?;
    let driver = renderer.render_driver(model).map_err(render_error)?;
    tracing::debug!(%target, "rendered test suite and parity driver");
    Ok(vec![
        GeneratedArtifact::new(
            ArtifactKind::TestSuite,
            Some(target),
            format!("{}/{}", target.as_str(), target.test_file()),
            suite,
            ctx.schema_hash(),
        ),
        GeneratedArtifact::new(
            ArtifactKind::ParityDriver,
            Some(target),
            format!("{}/{}", target.as_str(), target.driver_file()),
            driver,
            ctx.schema_hash(),
        ),
    ])
}
