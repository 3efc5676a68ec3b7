//! Tier 4 parity: every driver calls every endpoint against one mock
//!
//! Each call must decode to the canonical example payload. Calls run
//! concurrently; each is bounded by its own timeout.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use analysis::{compare_values, Difference};
use futures::future::join_all;
use mock::{MockOptions, MockServer};
use schema::EndpointDefinition;
use serde_json::Value;
use transport::{Envelope, RouteTable};

use crate::driver::{DriverOutput, SdkDriver};
use crate::error::{Result, TestgenError};
use crate::report::{Tier, TierReport};

/// Why one call did not match.
#[derive(Debug, Clone, PartialEq)]
pub enum ParityFailureKind {
    /// The call did not finish in time
    Timeout,
    /// The driver itself failed
    Driver(String),
    /// The call raised a typed error
    Error {
        /// Envelope result code
        code: i64,
        /// Error name
        name: String,
    },
    /// The decoded value differs from the canonical payload
    Mismatch(Vec<Difference>),
}

impl fmt::Display for ParityFailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParityFailureKind::Timeout => write!(f, "timed out"),
            ParityFailureKind::Driver(message) => write!(f, "driver failed: {}", message),
            ParityFailureKind::Error { code, name } => write!(f, "raised {} ({})", name, code),
            ParityFailureKind::Mismatch(differences) => {
                let items: Vec<String> = differences.iter().map(ToString::to_string).collect();
                write!(f, "{}", items.join("; "))
            }
        }
    }
}

/// One endpoint/driver pair that diverged.
#[derive(Debug, Clone, PartialEq)]
pub struct ParityFailure {
    /// Endpoint name
    pub endpoint: String,
    /// Driver name
    pub driver: String,
    /// What went wrong
    pub kind: ParityFailureKind,
}

/// One endpoint/driver pair that could not be called.
#[derive(Debug, Clone, PartialEq)]
pub struct ParitySkip {
    /// Endpoint name
    pub endpoint: String,
    /// Driver name
    pub driver: String,
    /// Why the call was not made
    pub reason: String,
}

/// Outcome of a parity run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParityReport {
    /// Calls attempted, skipped ones included
    pub checks: usize,
    /// Calls that diverged
    pub failures: Vec<ParityFailure>,
    /// Calls whose driver could not run
    pub skipped: Vec<ParitySkip>,
}

enum CheckOutcome {
    Matched,
    Skipped(ParitySkip),
    Diverged(ParityFailure),
}

impl ParityReport {
    /// Every call matched.
    pub fn is_success(&self) -> bool { self.failures.is_empty() }

    /// The report as a tier report.
    pub fn to_tier_report(&self) -> TierReport {
        let mut report = TierReport::new(Tier::Parity);
        for _ in (self.failures.len() + self.skipped.len())..self.checks {
            report.pass();
        }
        for _ in &self.skipped {
            report.skip();
        }
        for failure in &self.failures {
            report.fail(format!("{} via {}", failure.endpoint, failure.driver), failure.kind.to_string());
        }
        report
    }
}

/// Canonical payload of an endpoint: the `Response` of its example envelope.
pub fn canonical_payload(endpoint: &EndpointDefinition) -> Value {
    Envelope::from_text(&endpoint.response_text()).map(|e| e.response).unwrap_or(Value::Null)
}

/// Drives a set of SDK drivers over a set of endpoints.
pub struct ParityRunner {
    drivers: Vec<Arc<dyn SdkDriver>>,
    timeout: Duration,
}

impl ParityRunner {
    /// Runner bounding each call by `timeout`.
    pub fn new(drivers: Vec<Arc<dyn SdkDriver>>, timeout: Duration) -> Self { Self { drivers, timeout } }

    /// Names of the registered drivers.
    pub fn driver_names(&self) -> Vec<String> { self.drivers.iter().map(|d| d.name()).collect() }

    async fn check(
        &self,
        driver: Arc<dyn SdkDriver>,
        endpoint: &EndpointDefinition,
        mock_url: &str,
    ) -> CheckOutcome {
        let outcome = tokio::time::timeout(self.timeout, driver.call(endpoint, &endpoint.example_request, mock_url)).await;
        let kind = match outcome {
            Err(_) => ParityFailureKind::Timeout,
            Ok(Err(e @ TestgenError::ToolchainMissing { .. })) => {
                tracing::debug!(endpoint = %endpoint.name, driver = %driver.name(), "parity call skipped");
                return CheckOutcome::Skipped(ParitySkip {
                    endpoint: endpoint.name.clone(),
                    driver: driver.name(),
                    reason: e.to_string(),
                });
            }
            Ok(Err(e)) => ParityFailureKind::Driver(e.to_string()),
            Ok(Ok(DriverOutput::Error { code, name })) => ParityFailureKind::Error { code, name },
            Ok(Ok(DriverOutput::Value(value))) => {
                let differences = compare_values(&canonical_payload(endpoint), &value);
                if differences.is_empty() {
                    return CheckOutcome::Matched;
                }
                ParityFailureKind::Mismatch(differences)
            }
        };
        tracing::warn!(endpoint = %endpoint.name, driver = %driver.name(), %kind, "parity divergence");
        CheckOutcome::Diverged(ParityFailure { endpoint: endpoint.name.clone(), driver: driver.name(), kind })
    }

    /// Call every endpoint through every driver against the mock at `mock_url`.
    pub async fn run(&self, endpoints: &[EndpointDefinition], mock_url: &str) -> ParityReport {
        let calls = endpoints
            .iter()
            .flat_map(|endpoint| self.drivers.iter().map(move |driver| (endpoint, Arc::clone(driver))))
            .map(|(endpoint, driver)| self.check(driver, endpoint, mock_url));
        let results = join_all(calls).await;
        let mut report = ParityReport { checks: results.len(), ..ParityReport::default() };
        for result in results {
            match result {
                CheckOutcome::Matched => {}
                CheckOutcome::Skipped(skip) => report.skipped.push(skip),
                CheckOutcome::Diverged(failure) => report.failures.push(failure),
            }
        }
        tracing::info!(
            checks = report.checks,
            failed = report.failures.len(),
            skipped = report.skipped.len(),
            "parity run finished"
        );
        report
    }
}

/// Start the mock over `table`, run `runner` over `endpoints`, stop the mock.
pub async fn run_parity(
    table: RouteTable,
    options: MockOptions,
    runner: &ParityRunner,
    endpoints: &[EndpointDefinition],
) -> Result<ParityReport> {
    let server = MockServer::start_local(table, options).await?;
    let report = runner.run(endpoints, &server.url()).await;
    server.shutdown().await?;
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_tier_report_counts_passes() {
        let report = ParityReport {
            checks: 3,
            failures: vec![ParityFailure {
                endpoint: "checkWallet".into(),
                driver: "go".into(),
                kind: ParityFailureKind::Timeout,
            }],
            skipped: vec![],
        };
        let tier = report.to_tier_report();
        assert_eq!(tier.passed, 2);
        assert_eq!(tier.failed, 1);
        assert_eq!(tier.failures[0].subject, "checkWallet via go");
        assert_eq!(tier.failures[0].message, "timed out");
    }

    #[test]
    fn test_skipped_calls_are_neither_passed_nor_failed() {
        let report = ParityReport {
            checks: 2,
            failures: vec![],
            skipped: vec![ParitySkip {
                endpoint: "checkWallet".into(),
                driver: "go".into(),
                reason: "driver go: Go not installed".into(),
            }],
        };
        let tier = report.to_tier_report();
        assert_eq!((tier.passed, tier.failed, tier.skipped), (1, 0, 1));
        assert!(report.is_success());
    }
}
