//! Run options.

use std::path::PathBuf;

use config::Config;
use types::TargetLanguage;

use crate::PipelineError;

/// What one run reads, where it writes, and for which targets.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOptions {
    /// Current schema snapshot
    pub schema_path: PathBuf,
    /// Snapshot of the previous release, for regression checking
    pub baseline_path: Option<PathBuf>,
    /// Root of the generated tree
    pub output_dir: PathBuf,
    /// Targets to generate, in order
    pub targets: Vec<TargetLanguage>,
    /// Accept breaking changes against the baseline
    pub acknowledge_breaking: bool,
}

impl PipelineOptions {
    /// Create a new builder for PipelineOptions
    pub fn builder() -> PipelineOptionsBuilder { PipelineOptionsBuilder::default() }

    /// Options described by a configuration file.
    pub fn from_config(config: &Config) -> Self {
        Self {
            schema_path: config.schema.path.clone(),
            baseline_path: config.schema.baseline.clone(),
            output_dir: config.codegen.output_dir.clone(),
            targets: config.targets(),
            acknowledge_breaking: config.release.acknowledge_breaking,
        }
    }
}

#[derive(Debug, Default)]
/// Builder for PipelineOptions
pub struct PipelineOptionsBuilder {
    schema_path: Option<PathBuf>,
    baseline_path: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    targets: Option<Vec<TargetLanguage>>,
    acknowledge_breaking: bool,
}

impl PipelineOptionsBuilder {
    /// Set the schema snapshot path
    pub fn schema(mut self, path: impl Into<PathBuf>) -> Self {
        self.schema_path = Some(path.into());
        self
    }

    /// Set the baseline snapshot path
    pub fn baseline(mut self, path: Option<PathBuf>) -> Self {
        self.baseline_path = path;
        self
    }

    /// Set the output directory
    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    /// Set the targets (all targets when never called)
    pub fn targets(mut self, targets: Vec<TargetLanguage>) -> Self {
        self.targets = Some(targets);
        self
    }

    /// Accept breaking changes
    pub fn acknowledge_breaking(mut self, acknowledge: bool) -> Self {
        self.acknowledge_breaking = acknowledge;
        self
    }

    /// Build the PipelineOptions
    pub fn build(self) -> Result<PipelineOptions, PipelineError> {
        let mut targets = Vec::new();
        for t in self.targets.unwrap_or_else(|| TargetLanguage::ALL.to_vec()) {
            if !targets.contains(&t) {
                targets.push(t);
            }
        }
        if targets.is_empty() {
            return Err(PipelineError::Message("at least one target is required".to_string()));
        }
        Ok(PipelineOptions {
            schema_path: self
                .schema_path
                .ok_or_else(|| PipelineError::Message("schema path is required".to_string()))?,
            baseline_path: self.baseline_path,
            output_dir: self
                .output_dir
                .ok_or_else(|| PipelineError::Message("output directory is required".to_string()))?,
            targets,
            acknowledge_breaking: self.acknowledge_breaking,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults_to_every_target() {
        let options = PipelineOptions::builder().schema("s.json").output_dir("out").build().expect("options");
        assert_eq!(options.targets, TargetLanguage::ALL.to_vec());
        assert!(!options.acknowledge_breaking);
        assert_eq!(options.baseline_path, None);
    }

    #[test]
    fn test_builder_deduplicates_targets() {
        let options = PipelineOptions::builder()
            .schema("s.json")
            .output_dir("out")
            .targets(vec![TargetLanguage::Go, TargetLanguage::Python, TargetLanguage::Go])
            .build()
            .expect("options");
        assert_eq!(options.targets, vec![TargetLanguage::Go, TargetLanguage::Python]);
    }

    #[test]
    fn test_builder_requires_paths_and_targets() {
        assert!(PipelineOptions::builder().output_dir("out").build().is_err());
        assert!(PipelineOptions::builder().schema("s.json").build().is_err());
        assert!(PipelineOptions::builder().schema("s").output_dir("o").targets(vec![]).build().is_err());
    }

    #[test]
    fn test_from_config() {
        let config = Config::default();
        let options = PipelineOptions::from_config(&config);
        assert_eq!(options.schema_path, config.schema.path);
        assert_eq!(options.targets, config.targets());
    }
}
