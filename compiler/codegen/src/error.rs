//! Generation-time errors

use thiserror::Error;
use types::TargetLanguage;

/// A problem that is fatal to one target only.
///
/// Every variant names the target and, where there is one, the endpoint or
/// helper it was raised for.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    /// A parameter or return type does not resolve
    #[error("[{target}] {subject}: unresolved type `{type_name}`")]
    UnresolvedType {
        /// Target being generated
        target: TargetLanguage,
        /// Endpoint or helper
        subject: String,
        /// Unresolved type name
        type_name: String,
    },

    /// A list type nests itself
    #[error("[{target}] {subject}: type `{type_name}` nests itself")]
    CyclicType {
        /// Target being generated
        target: TargetLanguage,
        /// Endpoint or helper
        subject: String,
        /// Offending type name
        type_name: String,
    },

    /// No implementation for a helper, or a normalization names an unknown helper
    #[error("[{target}] {subject}: missing helper implementation `{helper}`")]
    MissingHelper {
        /// Target being generated
        target: TargetLanguage,
        /// Endpoint or helper
        subject: String,
        /// Helper name
        helper: String,
    },

    /// Two names map to the same identifier
    #[error("[{target}] {subject}: identifier `{identifier}` collides with {other}")]
    NamingCollision {
        /// Target being generated
        target: TargetLanguage,
        /// Endpoint or helper
        subject: String,
        /// Colliding identifier
        identifier: String,
        /// What it collides with
        other: String,
    },

    /// A helper snippet refers to a parameter, method or field that does not exist
    #[error("[{target}] {subject}: unknown placeholder `{placeholder}`")]
    UnknownPlaceholder {
        /// Target being generated
        target: TargetLanguage,
        /// Helper
        subject: String,
        /// Placeholder text
        placeholder: String,
    },

    /// A method of the catalog is absent from the rendered source
    #[error("[{target}] {subject}: method missing from rendered source")]
    MissingMethod {
        /// Target being generated
        target: TargetLanguage,
        /// Endpoint or helper
        subject: String,
    },

    /// The generation task panicked
    #[error("[{target}] generation panicked: {message}")]
    Panicked {
        /// Target being generated
        target: TargetLanguage,
        /// Panic payload
        message: String,
    },

    /// The renderer could not format the model
    #[error("[{target}] cannot render sdk: {message}")]
    Render {
        /// Target being generated
        target: TargetLanguage,
        /// Formatter error
        message: String,
    },

    /// Artifacts could not be staged or installed
    #[error("[{target}] cannot write artifacts: {message}")]
    Io {
        /// Target being generated
        target: TargetLanguage,
        /// I/O error
        message: String,
    },
}

impl GenerationError {
    /// Target the error belongs to.
    pub fn target(&self) -> TargetLanguage {
        match self {
            GenerationError::UnresolvedType { target, .. }
            | GenerationError::CyclicType { target, .. }
            | GenerationError::MissingHelper { target, .. }
            | GenerationError::NamingCollision { target, .. }
            | GenerationError::UnknownPlaceholder { target, .. }
            | GenerationError::MissingMethod { target, .. }
            | GenerationError::Panicked { target, .. }
            | GenerationError::Render { target, .. }
            | GenerationError::Io { target, .. } => *target,
        }
    }

    /// Endpoint or helper the error was raised for.
    pub fn subject(&self) -> Option<&str> {
        match self {
            GenerationError::UnresolvedType { subject, .. }
            | GenerationError::CyclicType { subject, .. }
            | GenerationError::MissingHelper { subject, .. }
            | GenerationError::NamingCollision { subject, .. }
            | GenerationError::UnknownPlaceholder { subject, .. }
            | GenerationError::MissingMethod { subject, .. } => Some(subject),
            GenerationError::Panicked { .. }
            | GenerationError::Render { .. }
            | GenerationError::Io { .. } => None,
        }
    }
}

/// The mock would serve something other than the canonical response text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("mock mismatch for `{endpoint}`: expected {expected}, served {}", .served.as_deref().unwrap_or("nothing"))]
pub struct MockMismatch {
    /// Endpoint name
    pub endpoint: String,
    /// `EndpointDefinition::response_text`
    pub expected: String,
    /// What the mock answered, if anything
    pub served: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_names_target_and_subject() {
        let err = GenerationError::UnresolvedType {
            target: TargetLanguage::Go,
            subject: "getWallet".into(),
            type_name: "Walet".into(),
        };
        assert_eq!(err.target(), TargetLanguage::Go);
        assert_eq!(err.subject(), Some("getWallet"));
        assert_eq!(err.to_string(), "[go] getWallet: unresolved type `Walet`");
    }

    #[test]
    fn test_mock_mismatch_display() {
        let err = MockMismatch { endpoint: "getAsset".into(), expected: "{}".into(), served: None };
        assert_eq!(err.to_string(), "mock mismatch for `getAsset`: expected {}, served nothing");
    }
}
