#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]

//! Target and version types for the Orbit compiler
//!
//! This crate names the SDK target languages, describes each target's naming
//! and type conventions as a [`TargetLanguageProfile`], and parses schema
//! versions. It knows nothing about a particular schema.

use thiserror::Error;

/// Target language profiles: naming rules, type tables, reserved words.
pub mod profile;
/// Type-safe target names and per-target file and command metadata.
pub mod target;
/// Schema version representation and parsing
pub mod version;

pub use profile::{
    AcronymStyle, CaseStyle, ErrorConvention, IdentifierKind, NamingRules, TargetLanguageProfile,
    TypeKey, TypeMappingTable,
};
pub use target::{SuiteFilter, TargetLanguage};
pub use version::SchemaVersion;

/// Errors raised by this crate.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TypesError {
    /// The target name is not one of the supported languages
    #[error("Unknown target language: {0}")]
    UnknownTarget(String),
    /// The provided string did not match the expected version format
    #[error("Invalid version format: {0}")]
    InvalidVersion(String),
    /// A numeric parse or regex error occurred
    #[error("Version parse error: {0}")]
    VersionParse(String),
}

/// Result type for this crate
pub type Result<T> = std::result::Result<T, TypesError>;
