//! Per-tier results

use std::fmt;

use serde::Serialize;

/// The test tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    /// Validators re-run over every definition, in process
    Contract,
    /// Helper test tables, per target
    Unit,
    /// Endpoints against the mock, per target
    Integration,
    /// The same request through every SDK
    Parity,
    /// Current snapshot against the baseline
    Regression,
}

impl Tier {
    /// Tiers in run order.
    pub const ALL: [Tier; 5] = [Tier::Contract, Tier::Unit, Tier::Integration, Tier::Parity, Tier::Regression];

    /// Tier from its CLI number; 4 covers parity and regression.
    pub fn from_number(n: u8) -> Option<Vec<Tier>> {
        match n {
            1 => Some(vec![Tier::Contract]),
            2 => Some(vec![Tier::Unit]),
            3 => Some(vec![Tier::Integration]),
            4 => Some(vec![Tier::Parity, Tier::Regression]),
            _ => None,
        }
    }

    /// Stable name used in reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Contract => "contract",
            Tier::Unit => "unit",
            Tier::Integration => "integration",
            Tier::Parity => "parity",
            Tier::Regression => "regression",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

/// One failed check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TierFailure {
    /// Target, endpoint or definition the check was about
    pub subject: String,
    /// What went wrong
    pub message: String,
}

/// Counts and failures of one tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TierReport {
    /// Tier
    pub tier: Tier,
    /// Checks that passed
    pub passed: usize,
    /// Checks that failed
    pub failed: usize,
    /// Checks that could not run
    pub skipped: usize,
    /// One entry per failed check
    pub failures: Vec<TierFailure>,
}

impl TierReport {
    /// An empty report.
    pub fn new(tier: Tier) -> Self { Self { tier, passed: 0, failed: 0, skipped: 0, failures: Vec::new() } }

    /// Count a passed check.
    pub fn pass(&mut self) { self.passed += 1; }

    /// Count a skipped check.
    pub fn skip(&mut self) { self.skipped += 1; }

    /// Record a failed check.
    pub fn fail(&mut self, subject: impl Into<String>, message: impl Into<String>) {
        self.failed += 1;
        self.failures.push(TierFailure { subject: subject.into(), message: message.into() });
    }

    /// Fold `other` into this report.
    pub fn merge(&mut self, other: TierReport) {
        self.passed += other.passed;
        self.failed += other.failed;
        self.skipped += other.skipped;
        self.failures.extend(other.failures);
    }

    /// Whether no check failed.
    pub fn is_success(&self) -> bool { self.failed == 0 }
}

impl fmt::Display for TierReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "tier {}: {} passed, {} failed, {} skipped",
            self.tier, self.passed, self.failed, self.skipped
        )?;
        for failure in &self.failures {
            write!(f, "\n  {}: {}", failure.subject, failure.message)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_and_display() {
        let mut report = TierReport::new(Tier::Unit);
        report.pass();
        report.skip();
        report.fail("go", "exit status 1");
        assert!(!report.is_success());
        assert_eq!(report.to_string(), "tier unit: 1 passed, 1 failed, 1 skipped\n  go: exit status 1");
    }

    #[test]
    fn test_tier_numbers() {
        assert_eq!(Tier::from_number(1), Some(vec![Tier::Contract]));
        assert_eq!(Tier::from_number(4), Some(vec![Tier::Parity, Tier::Regression]));
        assert_eq!(Tier::from_number(5), None);
    }
}
