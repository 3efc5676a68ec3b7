//! Outcome of a generation run

use std::fmt;
use std::path::PathBuf;

use analysis::RegressionReport;
use codegen::GenerationError;
use types::TargetLanguage;

/// Files installed for one target.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetOutcome {
    /// Target
    pub target: TargetLanguage,
    /// Installed files
    pub files: Vec<PathBuf>,
}

/// Everything a run produced and every target-level failure.
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    /// Schema version of the snapshot
    pub schema_version: String,
    /// Content hash of the snapshot
    pub schema_hash: String,
    /// Regression report, when a baseline was given
    pub regression: Option<RegressionReport>,
    /// OpenAPI document and mock route table
    pub shared: Vec<PathBuf>,
    /// Targets that were installed
    pub succeeded: Vec<TargetOutcome>,
    /// Failures of the remaining targets
    pub failures: Vec<GenerationError>,
}

impl RunReport {
    /// Every requested target was installed.
    pub fn is_success(&self) -> bool { self.failures.is_empty() }

    /// Targets with at least one failure, in first-failure order.
    pub fn failed_targets(&self) -> Vec<TargetLanguage> {
        let mut out = Vec::new();
        for e in &self.failures {
            if !out.contains(&e.target()) {
                out.push(e.target());
            }
        }
        out
    }

    /// Failures of one target.
    pub fn failures_for(&self, target: TargetLanguage) -> impl Iterator<Item = &GenerationError> {
        self.failures.iter().filter(move |e| e.target() == target)
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "schema {} ({})",
            self.schema_version,
            self.schema_hash.get(..12).unwrap_or(&self.schema_hash)
        )?;
        if let Some(regression) = &self.regression {
            writeln!(f, "regression: {} ({} change(s))", regression.state, regression.changes.len())?;
        }
        for outcome in &self.succeeded {
            writeln!(f, "  {}: ok ({} file(s))", outcome.target, outcome.files.len())?;
        }
        for target in self.failed_targets() {
            let errors: Vec<&GenerationError> = self.failures_for(target).collect();
            writeln!(f, "  {}: FAILED ({} error(s))", target, errors.len())?;
            for e in errors {
                writeln!(f, "    {}", e)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_itemizes_failures_per_target() {
        let report = RunReport {
            schema_version: "1.0.0".into(),
            schema_hash: "0123456789abcdef".into(),
            succeeded: vec![TargetOutcome { target: TargetLanguage::Python, files: vec![PathBuf::from("a")] }],
            failures: vec![
                GenerationError::MissingMethod { target: TargetLanguage::Go, subject: "checkWallet".into() },
                GenerationError::Panicked { target: TargetLanguage::Go, message: "boom".into() },
            ],
            ..RunReport::default()
        };
        assert!(!report.is_success());
        assert_eq!(report.failed_targets(), vec![TargetLanguage::Go]);
        let text = report.to_string();
        assert!(text.starts_with("schema 1.0.0 (0123456789ab)\n"));
        assert!(text.contains("  python: ok (1 file(s))\n"));
        assert!(text.contains("  go: FAILED (2 error(s))\n"));
        assert!(text.contains("    [go] checkWallet: method missing from rendered source\n"));
    }
}
