//! Per-test results read back from a generated suite's output
//!
//! Each target's runner is asked for a line-oriented format:
//! - Python: `pytest -v -rfE` status lines plus the short summary
//! - TypeScript: the node test runner's TAP reporter
//! - Go: `go test -json` events
//! - Java: the suite's own `PASS`/`FAIL`/`SKIP` lines

use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;
use serde::Deserialize;
use types::TargetLanguage;

/// Lines of a failing Go test's output kept in its message.
const GO_OUTPUT_LINES: usize = 5;

/// How one generated test ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseStatus {
    /// The test passed
    Passed,
    /// The test failed or errored
    Failed,
    /// The test did not run
    Skipped,
}

/// One generated test and its outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseResult {
    /// Test name as generated
    pub name: String,
    /// Outcome
    pub status: CaseStatus,
    /// Failure or skip reason, when the runner printed one
    pub message: Option<String>,
}

impl CaseResult {
    fn new(name: impl Into<String>, status: CaseStatus) -> Self {
        Self { name: name.into(), status, message: None }
    }
}

/// Ordered by first appearance; a later line for the same test refines it.
#[derive(Default)]
struct Cases {
    order: Vec<String>,
    by_name: BTreeMap<String, CaseResult>,
}

impl Cases {
    fn set(&mut self, name: &str, status: CaseStatus) {
        match self.by_name.get_mut(name) {
            Some(case) => case.status = status,
            None => {
                self.order.push(name.to_string());
                self.by_name.insert(name.to_string(), CaseResult::new(name, status));
            }
        }
    }

    fn message(&mut self, name: &str, message: &str) {
        let message = message.trim();
        if message.is_empty() {
            return;
        }
        if let Some(case) = self.by_name.get_mut(name) {
            case.message.get_or_insert_with(|| message.to_string());
        }
    }

    fn into_vec(mut self) -> Vec<CaseResult> {
        self.order.iter().filter_map(|name| self.by_name.remove(name)).collect()
    }
}

fn pattern(cell: &'static OnceLock<Option<Regex>>, source: &str) -> Option<&'static Regex> {
    cell.get_or_init(|| Regex::new(source).ok()).as_ref()
}

fn parse_pytest(stdout: &str) -> Vec<CaseResult> {
    static STATUS: OnceLock<Option<Regex>> = OnceLock::new();
    static SUMMARY: OnceLock<Option<Regex>> = OnceLock::new();
    let (Some(status), Some(summary)) = (
        pattern(&STATUS, r"^\S+::(\w+) (PASSED|FAILED|ERROR|SKIPPED|XFAIL|XPASS)(?: \((.*)\))?(?:\s+\[\s*\d+%\])?$"),
        pattern(&SUMMARY, r"^(?:FAILED|ERROR) \S+::(\w+)(?: - (.*))?$"),
    ) else {
        return Vec::new();
    };

    let mut cases = Cases::default();
    for line in stdout.lines().map(str::trim_end) {
        if let Some(c) = status.captures(line) {
            let name = &c[1];
            let outcome = match &c[2] {
                "PASSED" | "XFAIL" => CaseStatus::Passed,
                "SKIPPED" => CaseStatus::Skipped,
                _ => CaseStatus::Failed,
            };
            cases.set(name, outcome);
            if let Some(reason) = c.get(3) {
                cases.message(name, reason.as_str());
            }
        } else if let Some(c) = summary.captures(line) {
            cases.set(&c[1], CaseStatus::Failed);
            if let Some(message) = c.get(2) {
                cases.message(&c[1], message.as_str());
            }
        }
    }
    cases.into_vec()
}

fn parse_tap(stdout: &str) -> Vec<CaseResult> {
    static RESULT: OnceLock<Option<Regex>> = OnceLock::new();
    let Some(result) = pattern(&RESULT, r"^(not ok|ok) \d+ - (.+?)(?: # (SKIP|TODO)\b.*)?$") else {
        return Vec::new();
    };

    let mut cases = Cases::default();
    let mut failing: Option<String> = None;
    let mut lines = stdout.lines().map(str::trim_end).peekable();
    while let Some(line) = lines.next() {
        if let Some(c) = result.captures(line) {
            let name = c[2].replace("\\#", "#");
            let outcome = match (&c[1], c.get(3)) {
                (_, Some(_)) => CaseStatus::Skipped,
                ("ok", None) => CaseStatus::Passed,
                _ => CaseStatus::Failed,
            };
            cases.set(&name, outcome);
            failing = (outcome == CaseStatus::Failed).then_some(name);
            continue;
        }
        // Only the YAML block of a top-level failure carries its message.
        let Some(name) = failing.as_deref() else { continue };
        if let Some(error) = line.trim_start().strip_prefix("error:") {
            let error = error.trim();
            if error.starts_with('|') || error.starts_with('>') {
                if let Some(next) = lines.peek() {
                    cases.message(name, next);
                }
            } else {
                cases.message(name, error.trim_matches('\''));
            }
            failing = None;
        }
    }
    cases.into_vec()
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct GoEvent {
    action: String,
    #[serde(default)]
    test: Option<String>,
    #[serde(default)]
    output: Option<String>,
}

fn parse_go_json(stdout: &str) -> Vec<CaseResult> {
    let mut cases = Cases::default();
    let mut output: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for line in stdout.lines() {
        let Ok(event) = serde_json::from_str::<GoEvent>(line) else { continue };
        // Subtests report under their parent.
        let Some(test) = event.test.filter(|t| !t.contains('/')) else { continue };
        match event.action.as_str() {
            "pass" => cases.set(&test, CaseStatus::Passed),
            "fail" => {
                cases.set(&test, CaseStatus::Failed);
                let lines = output.remove(&test).unwrap_or_default();
                let tail = &lines[lines.len().saturating_sub(GO_OUTPUT_LINES)..];
                cases.message(&test, &tail.join("\n"));
            }
            "skip" => cases.set(&test, CaseStatus::Skipped),
            "output" => {
                let text = event.output.unwrap_or_default();
                let text = text.trim();
                if !text.is_empty() && !text.starts_with("=== ") && !text.starts_with("--- ") {
                    output.entry(test).or_default().push(text.to_string());
                }
            }
            _ => {}
        }
    }
    cases.into_vec()
}

fn parse_java(stdout: &str) -> Vec<CaseResult> {
    let mut cases = Cases::default();
    for line in stdout.lines().map(str::trim_end) {
        let (status, rest) = if let Some(rest) = line.strip_prefix("PASS ") {
            (CaseStatus::Passed, rest)
        } else if let Some(rest) = line.strip_prefix("FAIL ") {
            (CaseStatus::Failed, rest)
        } else if let Some(rest) = line.strip_prefix("SKIP ") {
            (CaseStatus::Skipped, rest)
        } else {
            continue;
        };
        let (name, message) = rest.split_once(": ").unwrap_or((rest, ""));
        cases.set(name, status);
        cases.message(name, message);
    }
    cases.into_vec()
}

/// Per-test results of `target`'s suite, from its standard output.
///
/// Lines the runner prints for anything else are ignored; an output with no
/// recognizable test line yields no cases.
pub fn parse_results(target: TargetLanguage, stdout: &str) -> Vec<CaseResult> {
    match target {
        TargetLanguage::Python => parse_pytest(stdout),
        TargetLanguage::TypeScript => parse_tap(stdout),
        TargetLanguage::Go => parse_go_json(stdout),
        TargetLanguage::Java => parse_java(stdout),
    }
}
