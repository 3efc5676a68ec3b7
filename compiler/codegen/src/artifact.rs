//! Generated artifacts

use std::path::PathBuf;

use serde::Serialize;
use types::TargetLanguage;

/// Kinds of generated artifacts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ArtifactKind {
    /// SDK client source unit
    SdkClass,
    /// Mock route table
    MockServer,
    /// Unit and integration tests of one target
    TestSuite,
    /// Parity driver program of one target
    ParityDriver,
    /// OpenAPI document of the catalog
    OpenapiDoc,
}

impl ArtifactKind {
    /// Stable name used in reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            ArtifactKind::SdkClass => "sdk-class",
            ArtifactKind::MockServer => "mock-server",
            ArtifactKind::TestSuite => "test-suite",
            ArtifactKind::ParityDriver => "parity-driver",
            ArtifactKind::OpenapiDoc => "openapi-doc",
        }
    }
}

/// One file of generated output.
///
/// The content is a pure function of the schema snapshot and the target
/// profile; `schema_hash` records which snapshot produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedArtifact {
    /// Artifact kind
    pub kind: ArtifactKind,
    /// Target, for per-target artifacts
    pub target: Option<TargetLanguage>,
    /// Path relative to the output directory
    pub path: PathBuf,
    /// File content
    pub content: String,
    /// Content hash of the source snapshot
    pub schema_hash: String,
}

impl GeneratedArtifact {
    /// Create an artifact; the content is normalized with [`clean_generated_source`].
    pub fn new(
        kind: ArtifactKind,
        target: Option<TargetLanguage>,
        path: impl Into<PathBuf>,
        content: impl AsRef<str>,
        schema_hash: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            target,
            path: path.into(),
            content: clean_generated_source(content.as_ref()),
            schema_hash: schema_hash.into(),
        }
    }
}

/// Trim trailing whitespace from each line and drop trailing blank lines.
/// Always ensures the returned string ends with a single newline when not empty.
pub fn clean_generated_source(src: &str) -> String {
    let mut lines: Vec<&str> = src.lines().map(str::trim_end).collect();

    while matches!(lines.last(), Some(line) if line.is_empty()) {
        lines.pop();
    }

    if lines.is_empty() {
        String::new()
    } else {
        format!("{}\n", lines.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_generated_source() {
        assert_eq!(clean_generated_source("a  \nb\t\n\n\n"), "a\nb\n");
        assert_eq!(clean_generated_source("\n\n"), "");
    }

    #[test]
    fn test_artifact_content_is_cleaned() {
        let artifact = GeneratedArtifact::new(
            ArtifactKind::OpenapiDoc,
            None,
            "openapi.json",
            "{}  \n\n",
            "abc",
        );
        assert_eq!(artifact.content, "{}\n");
        assert_eq!(artifact.kind.as_str(), "openapi-doc");
    }
}
