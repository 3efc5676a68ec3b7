#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]

//! Orbit Configuration
//!
//! This crate provides configuration management for Orbit.
//! It handles loading, saving, and managing configuration files that specify:
//! - Schema snapshot locations (current and release baseline)
//! - Logging configuration
//! - Code generation parameters (output directory, targets)
//! - Test tier settings (mock port, strict mode, parity endpoints and timeout)
//! - Release gating (breaking-change acknowledgment)
//!
//! Configuration is stored in TOML format. Every section and field has a
//! default, so a partial file is valid.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use types::TargetLanguage;

/// Errors that can occur when loading or saving configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),
    /// Failed to parse the TOML configuration file
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
    /// Failed to serialize configuration to TOML format
    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
    /// Configuration file was not found at the specified path
    #[error("Config file not found at: {0}")]
    NotFound(PathBuf),
    /// Could not locate the user's configuration directory
    #[error("Could not find user config directory")]
    ConfigDirUnavailable,
    /// A value is out of its accepted range
    #[error("Invalid config value for {field}: {reason}")]
    Invalid {
        /// Dotted field name
        field: &'static str,
        /// What is wrong with it
        reason: String,
    },
}

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Schema snapshot locations
    pub schema: SchemaConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
    /// Code generation settings
    pub codegen: CodegenConfig,
    /// Test tier settings
    pub testing: TestingConfig,
    /// Release gating
    pub release: ReleaseConfig,
}

/// Schema snapshot locations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchemaConfig {
    /// Current schema snapshot
    pub path: PathBuf,
    /// Prior snapshot the regression tier diffs against
    #[serde(skip_serializing_if = "Option::is_none")]
    pub baseline: Option<PathBuf>,
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self { path: PathBuf::from("resources/schema/circular-wallet.json"), baseline: None }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error) or a full filter directive
    pub level: String,
    /// Log file path (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self { Self { level: "info".to_string(), file: None } }
}

/// Code generation configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodegenConfig {
    /// Where to write generated artifacts
    pub output_dir: PathBuf,
    /// Targets to generate, in order
    pub targets: Vec<TargetLanguage>,
}

impl Default for CodegenConfig {
    fn default() -> Self {
        Self { output_dir: PathBuf::from("generated"), targets: TargetLanguage::ALL.to_vec() }
    }
}

/// Test tier configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TestingConfig {
    /// Mock server port; 0 picks a random free port
    pub mock_port: u16,
    /// Reject requests with a foreign `Version` or a missing required parameter
    pub strict_requests: bool,
    /// Endpoints exercised by the parity tier
    pub parity_endpoints: Vec<String>,
    /// Per-call timeout of the parity tier, in milliseconds
    pub parity_timeout_ms: u64,
    /// Timeout of one generated suite run (tiers 2 and 3), in seconds
    pub suite_timeout_secs: u64,
}

impl Default for TestingConfig {
    fn default() -> Self {
        Self {
            mock_port: 0,
            strict_requests: false,
            parity_endpoints: vec![
                "checkWallet".to_string(),
                "getWalletNonce".to_string(),
                "getBlockCount".to_string(),
            ],
            parity_timeout_ms: 10_000,
            suite_timeout_secs: 300,
        }
    }
}

impl TestingConfig {
    /// Per-call parity timeout.
    pub fn parity_timeout(&self) -> Duration { Duration::from_millis(self.parity_timeout_ms) }

    /// Timeout of one generated suite run.
    pub fn suite_timeout(&self) -> Duration { Duration::from_secs(self.suite_timeout_secs) }
}

/// Release gating configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReleaseConfig {
    /// Let breaking schema changes through without a major version bump
    pub acknowledge_breaking: bool,
}

impl Config {
    /// Load configuration from a TOML file at `path`
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&contents)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load `path` when given (it must exist), else the default path when it
    /// exists, else the built-in defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) if !p.exists() => Err(ConfigError::NotFound(p.to_path_buf())),
            Some(p) => Self::from_file(p),
            None => match Self::default_path() {
                Ok(p) if p.exists() => Self::from_file(p),
                _ => Ok(Self::default()),
            },
        }
    }

    /// Save this configuration as a pretty-printed TOML file at `path`
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Returns the default config file path:
    /// `{config_dir()}/orbit/config.toml`
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::ConfigDirUnavailable)?.join("orbit");
        Ok(config_dir.join("config.toml"))
    }

    /// Reject values no run could use.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.codegen.targets.is_empty() {
            return Err(ConfigError::Invalid {
                field: "codegen.targets",
                reason: "at least one target is required".to_string(),
            });
        }
        if self.testing.parity_timeout_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "testing.parity_timeout_ms",
                reason: "must be positive".to_string(),
            });
        }
        if self.testing.suite_timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "testing.suite_timeout_secs",
                reason: "must be positive".to_string(),
            });
        }
        Ok(())
    }

    /// Configured targets without duplicates, first occurrence first.
    pub fn targets(&self) -> Vec<TargetLanguage> {
        let mut out = Vec::new();
        for t in &self.codegen.targets {
            if !out.contains(t) {
                out.push(*t);
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::NamedTempFile;

    use super::*;

    #[test]
    fn test_from_file() {
        let temp_file = NamedTempFile::new().expect("Failed to create temporary file");
        let toml_content = r#"
            [schema]
            path = "schema.json"
            baseline = "baseline.json"

            [logging]
            level = "debug"
            file = "orbit.log"

            [codegen]
            output_dir = "out"
            targets = ["go", "python"]

            [testing]
            mock_port = 18080
            strict_requests = true
            parity_endpoints = ["getBlockCount"]
            parity_timeout_ms = 2500

            [release]
            acknowledge_breaking = true
        "#;
        fs::write(&temp_file, toml_content)
            .expect("Failed to write TOML content to temporary file");

        let config = Config::from_file(&temp_file).expect("Failed to load config");
        assert_eq!(config.schema.path, PathBuf::from("schema.json"));
        assert_eq!(config.schema.baseline, Some(PathBuf::from("baseline.json")));
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.file, Some(PathBuf::from("orbit.log")));
        assert_eq!(config.codegen.output_dir, PathBuf::from("out"));
        assert_eq!(config.targets(), vec![TargetLanguage::Go, TargetLanguage::Python]);
        assert_eq!(config.testing.mock_port, 18080);
        assert!(config.testing.strict_requests);
        assert_eq!(config.testing.parity_timeout(), Duration::from_millis(2500));
        assert!(config.release.acknowledge_breaking);

        let result = Config::from_file("nonexistent_file.toml");
        match result.expect_err("Expected error for nonexistent file") {
            ConfigError::FileRead(_) => {}
            _ => panic!("Expected FileRead error"),
        }

        fs::write(&temp_file, "invalid toml content").expect("Failed to write invalid TOML");
        match Config::from_file(&temp_file).expect_err("Expected parse error for invalid TOML") {
            ConfigError::Parse(_) => {}
            _ => panic!("Expected Parse error"),
        }
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config = Config::from_toml_str("[logging]\nlevel = \"warn\"\n").expect("partial");
        assert_eq!(config.logging.level, "warn");
        assert_eq!(config.codegen, CodegenConfig::default());
        assert_eq!(config.testing.parity_endpoints.len(), 3);
        assert!(!config.release.acknowledge_breaking);
    }

    #[test]
    fn test_invalid_values() {
        let err = Config::from_toml_str("[codegen]\ntargets = []\n").expect_err("empty targets");
        assert!(matches!(err, ConfigError::Invalid { field: "codegen.targets", .. }));

        let err = Config::from_toml_str("[codegen]\ntargets = [\"cobol\"]\n").expect_err("cobol");
        assert!(matches!(err, ConfigError::Parse(_)));

        let err = Config::from_toml_str("[testing]\nparity_timeout_ms = 0\n").expect_err("zero");
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }

    #[test]
    fn test_targets_deduplicated() {
        let mut config = Config::default();
        config.codegen.targets =
            vec![TargetLanguage::Java, TargetLanguage::Java, TargetLanguage::Go];
        assert_eq!(config.targets(), vec![TargetLanguage::Java, TargetLanguage::Go]);
    }

    #[test]
    fn test_save() {
        let config = Config::default();
        let temp_file =
            NamedTempFile::new().expect("Failed to create temporary file for save test");

        config.save(&temp_file).expect("save");
        let contents = fs::read_to_string(&temp_file).expect("Failed to read saved config file");
        assert!(contents.contains("circular-wallet.json"));
        assert!(contents.contains("typescript"));
        assert_eq!(Config::from_file(&temp_file).expect("reload"), config);

        let temp_dir = tempfile::tempdir().expect("Failed to create temporary directory");
        let non_existent_subdir = temp_dir.path().join("nonexistent").join("config.toml");
        match config.save(&non_existent_subdir).expect_err("Expected file write error") {
            ConfigError::FileRead(_) => (),
            other => panic!("Expected FileRead error, got {:?}", other),
        }
    }

    #[test]
    fn test_load_explicit_missing_path() {
        let err = Config::load(Some(Path::new("/definitely/not/here.toml"))).expect_err("missing");
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn test_default_path() {
        let path = Config::default_path().expect("Failed to get default config path");
        let path_str = path.to_str().expect("Path should be valid UTF-8");
        assert!(path_str.contains("orbit"));
        assert!(path_str.ends_with("config.toml"));
    }
}
