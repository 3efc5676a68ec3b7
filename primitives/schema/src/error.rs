//! Schema error types

use thiserror::Error;

/// A value failed a type definition's predicate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field_path}: expected {expected}, got {actual}")]
pub struct ContractViolation {
    /// Path of the offending value, rooted at `$` (e.g. `$.Response.exists`)
    pub field_path: String,
    /// What the contract required
    pub expected: String,
    /// What was found
    pub actual: String,
}

impl ContractViolation {
    /// Create a violation at `field_path`.
    pub fn new(
        field_path: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self { field_path: field_path.into(), expected: expected.into(), actual: actual.into() }
    }
}

/// A malformed definition. Any schema error blocks all generation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// Two definitions share a name
    #[error("duplicate {kind} `{name}`")]
    Duplicate {
        /// Definition kind (type, endpoint, helper, dispatch key, ...)
        kind: &'static str,
        /// The duplicated name
        name: String,
    },

    /// A reference names a type that is not registered
    #[error("{location}: unresolved type `{type_name}`")]
    UnresolvedType {
        /// Where the reference occurs (e.g. `endpoint checkWallet param Address`)
        location: String,
        /// The unknown type name
        type_name: String,
    },

    /// A definition is structurally invalid
    #[error("{location}: {reason}")]
    Malformed {
        /// Where the problem occurs
        location: String,
        /// Description of the problem
        reason: String,
    },

    /// A canonical example does not satisfy its own schema
    #[error("{location}: example does not satisfy schema: {violation}")]
    ExampleViolation {
        /// Which example (e.g. `endpoint checkWallet example_request`)
        location: String,
        /// The underlying violation
        violation: ContractViolation,
    },

    /// The snapshot file could not be read or written
    #[error("snapshot I/O error at {path}: {message}")]
    Io {
        /// File path
        path: String,
        /// Underlying error message
        message: String,
    },

    /// The snapshot file is not valid JSON for the model
    #[error("snapshot parse error: {0}")]
    Parse(String),
}

impl SchemaError {
    /// Shorthand for [`SchemaError::Malformed`].
    pub fn malformed(location: impl Into<String>, reason: impl Into<String>) -> Self {
        SchemaError::Malformed { location: location.into(), reason: reason.into() }
    }
}

/// Result type for schema operations
pub type Result<T> = std::result::Result<T, SchemaError>;
