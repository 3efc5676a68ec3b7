//! In-process tiers: contract (tier 1) and regression (tier 4b)

use analysis::{check_regression, SchemaValidator};
use registry::Registries;
use schema::SchemaSnapshot;

use crate::report::{Tier, TierReport};

/// Check every type, endpoint and helper; each definition is one check.
pub fn run_contract_tier(registries: &Registries) -> TierReport {
    let validator = SchemaValidator::new(registries);
    let mut report = TierReport::new(Tier::Contract);

    let types = registries.types.iter().filter(|d| !registries.types.is_builtin(&d.name));
    let checks = types
        .map(|d| (format!("type {}", d.name), validator.check_type(d)))
        .chain(registries.endpoints.iter().map(|d| (format!("endpoint {}", d.name), validator.check_endpoint(d))))
        .chain(registries.helpers.iter().map(|d| (format!("helper {}", d.name), validator.check_helper(d))));

    for (subject, errors) in checks {
        if errors.is_empty() {
            report.pass();
        } else {
            let messages: Vec<String> = errors.iter().map(ToString::to_string).collect();
            report.fail(subject, messages.join("; "));
        }
    }
    tracing::info!(passed = report.passed, failed = report.failed, "contract tier finished");
    report
}

/// Tier 4b: classify `current` against `previous`.
///
/// Each change is one check; a breaking change fails unless acknowledged.
/// An unchanged snapshot counts as one passed check.
pub fn run_regression_tier(previous: &SchemaSnapshot, current: &SchemaSnapshot, acknowledge: bool) -> TierReport {
    let regression = check_regression(previous, current, acknowledge);
    let mut report = TierReport::new(Tier::Regression);
    if regression.changes.is_empty() {
        report.pass();
    }
    for change in &regression.changes {
        if change.is_breaking() && regression.state.is_blocked() {
            report.fail(change.subject.clone(), change.to_string());
        } else {
            report.pass();
        }
    }
    tracing::info!(state = %regression.state, changes = regression.changes.len(), "regression tier finished");
    report
}
