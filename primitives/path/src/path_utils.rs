// SPDX-License-Identifier: CC0-1.0

//! Path utility functions for finding project roots and resolving paths.

use std::path::{Path, PathBuf};

use thiserror::Error;
use types::TargetLanguage;

/// Relative location of the canonical schema snapshot.
pub const CANONICAL_SCHEMA: &str = "resources/schema/circular-wallet.json";

/// Relative location of the release baseline snapshot.
pub const BASELINE_SCHEMA: &str = "resources/schema/baseline.json";

/// Path resolution failures.
#[derive(Debug, Error)]
pub enum PathError {
    /// No ancestor of the start directory holds a workspace manifest
    #[error("Could not find workspace root (no workspace Cargo.toml above {0})")]
    NoWorkspaceRoot(PathBuf),

    /// An input path does not exist
    #[error("Input file not found: {path}: {reason}")]
    NotFound {
        /// Resolved path
        path: PathBuf,
        /// Underlying I/O error
        reason: String,
    },

    /// Underlying I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Find the workspace root by looking for the root Cargo.toml
///
/// Walks up the directory tree from `start` until it finds a `Cargo.toml`
/// file containing `[workspace]`.
pub fn find_project_root_from(start: &Path) -> Result<PathBuf, PathError> {
    let mut current = start.to_path_buf();
    loop {
        let cargo_toml = current.join("Cargo.toml");
        if cargo_toml.exists() {
            let contents = std::fs::read_to_string(&cargo_toml)?;
            if contents.contains("[workspace]") {
                return Ok(current);
            }
        }
        if !current.pop() {
            return Err(PathError::NoWorkspaceRoot(start.to_path_buf()));
        }
    }
}

/// Find the workspace root starting from the current directory.
pub fn find_project_root() -> Result<PathBuf, PathError> {
    find_project_root_from(&std::env::current_dir()?)
}

/// Path of the canonical schema snapshot under `project_root`.
pub fn canonical_schema_path(project_root: &Path) -> PathBuf { project_root.join(CANONICAL_SCHEMA) }

/// Path of the baseline schema snapshot under `project_root`.
pub fn baseline_schema_path(project_root: &Path) -> PathBuf { project_root.join(BASELINE_SCHEMA) }

/// Validate and resolve an input file path
///
/// Relative paths are resolved against `base`; absolute paths are kept.
/// The result is canonicalized, so the file must exist.
pub fn resolve_input_path(input_path: &Path, base: &Path) -> Result<PathBuf, PathError> {
    let resolved = if input_path.is_absolute() { input_path.to_path_buf() } else { base.join(input_path) };

    resolved
        .canonicalize()
        .map_err(|e| PathError::NotFound { path: resolved.clone(), reason: e.to_string() })
}

/// Directory holding the artifacts of one target under `out_dir`.
pub fn target_dir(out_dir: &Path, target: TargetLanguage) -> PathBuf { out_dir.join(target.as_str()) }

/// Directory holding the mock route table under `out_dir`.
pub fn mock_dir(out_dir: &Path) -> PathBuf { out_dir.join("mock") }

/// Format a version string for file names (`2.0.0-alpha.1` -> `2_0_0_alpha_1`).
///
/// ```
/// use orbit_path::version_for_filename;
/// assert_eq!(version_for_filename("v1.2.3"), "1_2_3");
/// assert_eq!(version_for_filename("2.0.0-alpha.1"), "2_0_0_alpha_1");
/// ```
pub fn version_for_filename(version: &str) -> String {
    version
        .trim_start_matches('v')
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_project_root_from_nested_dir() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("Cargo.toml"), "[workspace]\nmembers = []\n").expect("write");
        let nested = dir.path().join("a/b");
        std::fs::create_dir_all(&nested).expect("mkdir");
        let root = find_project_root_from(&nested).expect("root");
        assert_eq!(root, dir.path());
    }

    #[test]
    fn test_resolve_input_path() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("schema.json"), "{}").expect("write");
        let resolved = resolve_input_path(Path::new("schema.json"), dir.path()).expect("resolve");
        assert!(resolved.ends_with("schema.json"));
        assert!(matches!(
            resolve_input_path(Path::new("missing.json"), dir.path()),
            Err(PathError::NotFound { .. })
        ));
    }

    #[test]
    fn test_layout() {
        let out = Path::new("generated");
        assert_eq!(target_dir(out, TargetLanguage::TypeScript), Path::new("generated/typescript"));
        assert_eq!(mock_dir(out), Path::new("generated/mock"));
        assert_eq!(canonical_schema_path(Path::new("/r")), Path::new("/r").join(CANONICAL_SCHEMA));
    }
}
