//! Type-safe names for the SDK target languages.
//!
//! To add a target: add a variant to `TargetLanguage`, a row to
//! `TARGET_METADATA`, a profile in `profile.rs`, and one renderer plus one
//! helper emitter in `orbit-codegen`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::TypesError;

/// SDK target languages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetLanguage {
    /// Python 3 (exceptions)
    Python,
    /// TypeScript on Node (result type)
    TypeScript,
    /// Go (typed error values)
    Go,
    /// Java 22+ (exceptions; single-file launch of several source files)
    Java,
}

/// Test tier selectors understood by the generated test suites.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SuiteFilter {
    /// Helper unit tests
    Unit,
    /// Endpoint integration tests
    Integration,
}

/// Metadata for a target variant.
struct TargetMetadata {
    as_str: &'static str,
    display_name: &'static str,
    sdk_file: &'static str,
    test_file: &'static str,
    driver_file: &'static str,
    unit_prefix: &'static str,
    integration_prefix: &'static str,
    surface_pattern: &'static str,
    toolchain: &'static str,
    test_command: &'static [&'static str],
    driver_command: &'static [&'static str],
}

const TARGET_METADATA: [TargetMetadata; 4] = [
    TargetMetadata {
        as_str: "python",
        display_name: "Python",
        sdk_file: "circular_protocol.py",
        test_file: "test_circular_protocol.py",
        driver_file: "parity_driver.py",
        unit_prefix: "test_unit_",
        integration_prefix: "test_integration_",
        surface_pattern: r"(?m)^    def ([a-z][a-z0-9_]*)\(self",
        toolchain: "Python 3 with pytest",
        test_command: &["python3", "-m", "pytest", "-v", "-rfE", "test_circular_protocol.py", "-k", "{filter}"],
        driver_command: &["python3", "parity_driver.py"],
    },
    TargetMetadata {
        as_str: "typescript",
        display_name: "TypeScript",
        sdk_file: "circular-protocol.ts",
        test_file: "circular-protocol.test.ts",
        driver_file: "parity-driver.ts",
        unit_prefix: "unit_",
        integration_prefix: "integration_",
        surface_pattern: r"(?m)^  (?:async )?([a-z][a-zA-Z0-9]*)\(",
        toolchain: "Node 20+ with tsx",
        test_command: &[
            "npx",
            "tsx",
            "--test",
            "--test-reporter=tap",
            "--test-name-pattern={filter}",
            "circular-protocol.test.ts",
        ],
        driver_command: &["npx", "tsx", "parity-driver.ts"],
    },
    TargetMetadata {
        as_str: "go",
        display_name: "Go",
        sdk_file: "circular_protocol.go",
        test_file: "circular_protocol_test.go",
        driver_file: "parity_driver_test.go",
        unit_prefix: "TestUnit",
        integration_prefix: "TestIntegration",
        surface_pattern: r"(?m)^func \(c \*[A-Za-z]+\) ([A-Z][A-Za-z0-9]*)\(",
        toolchain: "Go",
        test_command: &["go", "test", "-count=1", "-json", "-run", "^{filter}", "."],
        driver_command: &["go", "test", "-count=1", "-v", "-run", "^TestParityDriver$", "."],
    },
    TargetMetadata {
        as_str: "java",
        display_name: "Java",
        sdk_file: "CircularProtocolClient.java",
        test_file: "CircularProtocolClientTest.java",
        driver_file: "ParityDriver.java",
        unit_prefix: "unit",
        integration_prefix: "integration",
        surface_pattern: r"(?m)^    public (?:static )?[A-Za-z][\w<>, ?\[\]]* ([a-z][a-zA-Z0-9]*)\(",
        toolchain: "JDK 22+",
        test_command: &["java", "CircularProtocolClientTest.java", "{filter}"],
        driver_command: &["java", "ParityDriver.java"],
    },
];

impl TargetLanguage {
    /// All targets, in generation order.
    pub const ALL: [TargetLanguage; 4] =
        [TargetLanguage::Python, TargetLanguage::TypeScript, TargetLanguage::Go, TargetLanguage::Java];

    fn metadata(&self) -> &'static TargetMetadata {
        let index = match self {
            TargetLanguage::Python => 0,
            TargetLanguage::TypeScript => 1,
            TargetLanguage::Go => 2,
            TargetLanguage::Java => 3,
        };
        &TARGET_METADATA[index]
    }

    /// Stable identifier (also the key of helper overrides and output directories).
    pub fn as_str(&self) -> &'static str { self.metadata().as_str }

    /// Human-readable name.
    pub fn display_name(&self) -> &'static str { self.metadata().display_name }

    /// File name of the SDK source unit.
    pub fn sdk_file(&self) -> &'static str { self.metadata().sdk_file }

    /// File name of the generated test suite.
    pub fn test_file(&self) -> &'static str { self.metadata().test_file }

    /// File name of the parity driver.
    pub fn driver_file(&self) -> &'static str { self.metadata().driver_file }

    /// Prefix every generated test name of `filter`'s tier starts with.
    pub fn test_prefix(&self, filter: SuiteFilter) -> &'static str {
        match filter {
            SuiteFilter::Unit => self.metadata().unit_prefix,
            SuiteFilter::Integration => self.metadata().integration_prefix,
        }
    }

    /// Pattern whose first capture group is a public SDK method name.
    pub fn surface_pattern(&self) -> &'static str { self.metadata().surface_pattern }

    /// Toolchain the generated suite and parity driver need.
    pub fn toolchain(&self) -> &'static str { self.metadata().toolchain }

    /// Command that runs the generated tests of one tier, from the target directory.
    ///
    /// Its output reports every test on its own line.
    pub fn test_command(&self, filter: SuiteFilter) -> Vec<String> {
        let prefix = self.test_prefix(filter);
        self.metadata().test_command.iter().map(|arg| arg.replace("{filter}", prefix)).collect()
    }

    /// Command that runs the parity driver, from the target directory.
    pub fn driver_command(&self) -> Vec<String> {
        self.metadata().driver_command.iter().map(|arg| arg.to_string()).collect()
    }
}

impl FromStr for TargetLanguage {
    type Err = TypesError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "python" | "py" => Ok(TargetLanguage::Python),
            "typescript" | "ts" => Ok(TargetLanguage::TypeScript),
            "go" | "golang" => Ok(TargetLanguage::Go),
            "java" => Ok(TargetLanguage::Java),
            _ => Err(TypesError::UnknownTarget(s.to_string())),
        }
    }
}

impl fmt::Display for TargetLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.as_str()) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_as_str_roundtrip() {
        for target in TargetLanguage::ALL {
            assert_eq!(target.as_str().parse::<TargetLanguage>().ok(), Some(target));
        }
        assert_eq!("TS".parse::<TargetLanguage>().ok(), Some(TargetLanguage::TypeScript));
        assert!("cobol".parse::<TargetLanguage>().is_err());
    }

    #[test]
    fn test_file_names_are_distinct_per_target() {
        for target in TargetLanguage::ALL {
            assert_ne!(target.sdk_file(), target.test_file());
            assert_ne!(target.test_file(), target.driver_file());
        }
    }

    #[test]
    fn test_test_command_substitutes_tier_prefix() {
        let cmd = TargetLanguage::Go.test_command(SuiteFilter::Integration);
        assert!(cmd.contains(&"^TestIntegration".to_string()));

        let cmd = TargetLanguage::Python.test_command(SuiteFilter::Unit);
        assert_eq!(cmd.last().map(String::as_str), Some("test_unit_"));
    }

    #[test]
    fn test_test_commands_report_each_test() {
        assert!(TargetLanguage::Python.test_command(SuiteFilter::Unit).contains(&"-v".to_string()));
        assert!(TargetLanguage::TypeScript
            .test_command(SuiteFilter::Unit)
            .contains(&"--test-reporter=tap".to_string()));
        assert!(TargetLanguage::Go.test_command(SuiteFilter::Unit).contains(&"-json".to_string()));
    }

    #[test]
    fn test_java_needs_multi_file_source_launch() {
        assert_eq!(TargetLanguage::Java.toolchain(), "JDK 22+");
        assert_eq!(TargetLanguage::Java.test_command(SuiteFilter::Unit)[0], "java");
    }

    #[test]
    fn test_serde_uses_lowercase_ids() {
        let json = serde_json::to_string(&TargetLanguage::TypeScript).expect("serialize");
        assert_eq!(json, "\"typescript\"");
    }
}
