//! Running generated suites as subprocesses (tiers 2 and 3)
//!
//! Every generated test is one check; see [`crate::results`]. A toolchain
//! that is not installed makes its target skipped, not failed.

use std::io::{self, Read};
use std::path::Path;
use std::process::{Command, Stdio};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use futures::future::join_all;
use mock::{MockOptions, MockServer};
use transport::RouteTable;
use types::{SuiteFilter, TargetLanguage};
use wait_timeout::ChildExt;

use crate::error::Result;
use crate::report::{Tier, TierReport};
use crate::results::{parse_results, CaseResult, CaseStatus};
use crate::MOCK_URL_ENV;

/// Lines of output kept in a failure message.
const TAIL_LINES: usize = 20;

/// What a finished (or killed) subprocess left behind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutcome {
    /// Exit code; `None` when killed
    pub status: Option<i32>,
    /// Captured standard output
    pub stdout: String,
    /// Captured standard error
    pub stderr: String,
    /// Whether the timeout expired
    pub timed_out: bool,
}

impl CommandOutcome {
    /// Exited with status 0 in time.
    pub fn success(&self) -> bool { !self.timed_out && self.status == Some(0) }

    /// Last lines of stdout and stderr, for reports.
    pub fn tail(&self) -> String {
        let combined = format!("{}{}", self.stdout, self.stderr);
        let lines: Vec<&str> = combined.lines().collect();
        lines[lines.len().saturating_sub(TAIL_LINES)..].join("\n")
    }

    /// One-line summary of a failure.
    pub fn describe(&self) -> String {
        if self.timed_out {
            "timed out".to_string()
        } else {
            match self.status {
                Some(code) => format!("exit status {}\n{}", code, self.tail()),
                None => format!("terminated by signal\n{}", self.tail()),
            }
        }
    }
}

fn drain<R: Read + Send + 'static>(mut pipe: R) -> JoinHandle<String> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = pipe.read_to_end(&mut buf);
        String::from_utf8_lossy(&buf).into_owned()
    })
}

fn collect(handle: Option<JoinHandle<String>>) -> String {
    handle.and_then(|h| h.join().ok()).unwrap_or_default()
}

/// Run `args` in `dir` with extra environment, killing it after `timeout`.
///
/// Returns `Ok(None)` when the program is not installed.
pub fn run_command(
    args: &[String],
    dir: &Path,
    env: &[(&str, String)],
    timeout: Duration,
) -> Result<Option<CommandOutcome>> {
    let Some((program, rest)) = args.split_first() else {
        return Err(io::Error::new(io::ErrorKind::InvalidInput, "empty command").into());
    };
    let mut cmd = Command::new(program);
    cmd.args(rest).current_dir(dir).stdin(Stdio::null()).stdout(Stdio::piped()).stderr(Stdio::piped());
    for (key, value) in env {
        cmd.env(key, value);
    }

    let mut child = match cmd.spawn() {
        Ok(child) => child,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            tracing::warn!(%program, "toolchain not installed");
            return Ok(None);
        }
        Err(e) => return Err(e.into()),
    };
    tracing::debug!(%program, dir = %dir.display(), "spawned");

    let stdout = child.stdout.take().map(drain);
    let stderr = child.stderr.take().map(drain);
    match child.wait_timeout(timeout)? {
        Some(status) => Ok(Some(CommandOutcome {
            status: status.code(),
            stdout: collect(stdout),
            stderr: collect(stderr),
            timed_out: false,
        })),
        None => {
            child.kill()?;
            child.wait()?;
            tracing::warn!(%program, ?timeout, "killed after timeout");
            // Grandchildren may still hold the pipes; the reader threads are left to finish on their own.
            Ok(Some(CommandOutcome { status: None, stdout: String::new(), stderr: String::new(), timed_out: true }))
        }
    }
}

fn record(
    report: &mut TierReport,
    target: TargetLanguage,
    filter: SuiteFilter,
    outcome: Result<Option<CommandOutcome>>,
) {
    let outcome = match outcome {
        Ok(Some(outcome)) => outcome,
        Ok(None) => {
            tracing::info!(%target, toolchain = target.toolchain(), "skipped, toolchain not installed");
            return report.skip();
        }
        Err(e) => return report.fail(target.as_str(), e.to_string()),
    };
    let prefix = target.test_prefix(filter);
    let cases: Vec<CaseResult> =
        parse_results(target, &outcome.stdout).into_iter().filter(|case| case.name.starts_with(prefix)).collect();
    for case in &cases {
        match case.status {
            CaseStatus::Passed => report.pass(),
            CaseStatus::Skipped => report.skip(),
            CaseStatus::Failed => report.fail(
                format!("{} {}", target, case.name),
                case.message.clone().unwrap_or_else(|| "failed".to_string()),
            ),
        }
    }
    // A suite that failed without naming a failing test (build error, timeout, crash) fails as a whole.
    let named_failure = cases.iter().any(|case| case.status == CaseStatus::Failed);
    if !outcome.success() && !named_failure {
        report.fail(target.as_str(), outcome.describe());
    } else if cases.is_empty() {
        tracing::warn!(%target, ?filter, "suite passed without reporting any test");
    }
}

fn run_suite(
    target: TargetLanguage,
    out_dir: &Path,
    filter: SuiteFilter,
    env: &[(&str, String)],
    timeout: Duration,
) -> Result<Option<CommandOutcome>> {
    let dir = out_dir.join(target.as_str());
    if !dir.join(target.test_file()).is_file() {
        return Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("{} suite not generated in {}", target, dir.display()),
        )
        .into());
    }
    tracing::info!(%target, ?filter, "running generated suite");
    run_command(&target.test_command(filter), &dir, env, timeout)
}

/// Tier 2: run each target's unit tests; one check per generated test.
pub fn run_unit_tier(out_dir: &Path, targets: &[TargetLanguage], timeout: Duration) -> TierReport {
    let mut report = TierReport::new(Tier::Unit);
    for target in targets {
        let outcome = run_suite(*target, out_dir, SuiteFilter::Unit, &[], timeout);
        record(&mut report, *target, SuiteFilter::Unit, outcome);
    }
    report
}

/// Tier 3: start the mock once and run each target's integration tests against it.
pub async fn run_integration_tier(
    out_dir: &Path,
    targets: &[TargetLanguage],
    table: RouteTable,
    options: MockOptions,
    timeout: Duration,
) -> Result<TierReport> {
    let server = MockServer::start_local(table, options).await?;
    let url = server.url();

    let runs = targets.iter().map(|target| {
        let target = *target;
        let dir = out_dir.to_path_buf();
        let url = url.clone();
        async move {
            let outcome = tokio::task::spawn_blocking(move || {
                run_suite(target, &dir, SuiteFilter::Integration, &[(MOCK_URL_ENV, url)], timeout)
            })
            .await;
            (target, outcome)
        }
    });
    let outcomes = join_all(runs).await;
    server.shutdown().await?;

    let mut report = TierReport::new(Tier::Integration);
    for (target, outcome) in outcomes {
        match outcome {
            Ok(outcome) => record(&mut report, target, SuiteFilter::Integration, outcome),
            Err(e) => report.fail(target.as_str(), e.to_string()),
        }
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_program_is_none() {
        let dir = tempfile::tempdir().expect("tempdir");
        let args = vec!["orbit-no-such-toolchain".to_string()];
        let outcome = run_command(&args, dir.path(), &[], Duration::from_secs(5)).expect("run");
        assert!(outcome.is_none());
    }

    #[cfg(unix)]
    #[test]
    fn test_output_and_status_are_captured() {
        let dir = tempfile::tempdir().expect("tempdir");
        let args: Vec<String> =
            ["sh", "-c", "echo out; echo err >&2; exit 3"].iter().map(|s| s.to_string()).collect();
        let outcome = run_command(&args, dir.path(), &[], Duration::from_secs(10)).expect("run").expect("sh");
        assert_eq!(outcome.status, Some(3));
        assert_eq!(outcome.stdout, "out\n");
        assert_eq!(outcome.stderr, "err\n");
        assert!(!outcome.success());
    }

    #[cfg(unix)]
    #[test]
    fn test_timeout_kills() {
        let dir = tempfile::tempdir().expect("tempdir");
        let args: Vec<String> = ["sleep", "5"].iter().map(|s| s.to_string()).collect();
        let outcome =
            run_command(&args, dir.path(), &[], Duration::from_millis(100)).expect("run").expect("sleep");
        assert!(outcome.timed_out);
        assert_eq!(outcome.describe(), "timed out");
    }

    #[test]
    fn test_missing_suite_fails_the_target() {
        let dir = tempfile::tempdir().expect("tempdir");
        let report = run_unit_tier(dir.path(), &[TargetLanguage::Python], Duration::from_secs(1));
        assert_eq!(report.failed, 1);
        assert_eq!(report.failures[0].subject, "python");
    }

    fn exited(status: i32, stdout: &str) -> Result<Option<CommandOutcome>> {
        Ok(Some(CommandOutcome { status: Some(status), stdout: stdout.to_string(), stderr: String::new(), timed_out: false }))
    }

    #[test]
    fn test_each_helper_case_is_one_check() {
        let stdout = "\
test_circular_protocol.py::test_unit_hex_fix_0 PASSED                    [ 33%]
test_circular_protocol.py::test_unit_hex_fix_1 FAILED                    [ 66%]
test_circular_protocol.py::test_unit_pad_number_0 PASSED                 [100%]
FAILED test_circular_protocol.py::test_unit_hex_fix_1 - AssertionError: assert '0xabcd' == 'abcd'
";
        let mut report = TierReport::new(Tier::Unit);
        record(&mut report, TargetLanguage::Python, SuiteFilter::Unit, exited(1, stdout));
        assert_eq!((report.passed, report.failed, report.skipped), (2, 1, 0));
        assert_eq!(report.failures[0].subject, "python test_unit_hex_fix_1");
        assert_eq!(report.failures[0].message, "AssertionError: assert '0xabcd' == 'abcd'");
    }

    #[test]
    fn test_only_the_tier_prefix_is_counted() {
        let stdout = "PASS unitHexFix0\nSKIP integrationCheckWallet: ORBIT_MOCK_URL is not set\nPASS unitHexFix1\n";
        let mut report = TierReport::new(Tier::Unit);
        record(&mut report, TargetLanguage::Java, SuiteFilter::Unit, exited(0, stdout));
        assert_eq!((report.passed, report.failed, report.skipped), (2, 0, 0));
    }

    #[test]
    fn test_suite_failure_without_named_tests_fails_the_target() {
        let stdout = "{\"Action\":\"output\",\"Package\":\"circular\",\"Output\":\"build failed\\n\"}\n";
        let mut report = TierReport::new(Tier::Unit);
        record(&mut report, TargetLanguage::Go, SuiteFilter::Unit, exited(1, stdout));
        assert_eq!((report.passed, report.failed), (0, 1));
        assert_eq!(report.failures[0].subject, "go");
        assert!(report.failures[0].message.starts_with("exit status 1"));
    }

    #[test]
    fn test_missing_toolchain_skips_the_target() {
        let mut report = TierReport::new(Tier::Integration);
        record(&mut report, TargetLanguage::TypeScript, SuiteFilter::Integration, Ok(None));
        assert_eq!((report.passed, report.failed, report.skipped), (0, 0, 1));
    }
}
