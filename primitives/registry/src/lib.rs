#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]

//! Registries: lightweight read-only databases over one schema snapshot.
//!
//! [`SchemaRegistry`] holds type definitions and validates values against
//! them, [`EndpointCatalog`] holds the API operations in authoring order, and
//! [`HelperRegistry`] holds the cross-cutting helper methods. All three are
//! built once per run from a frozen snapshot and never mutated afterwards.

pub mod catalog;
pub mod helpers;
pub mod types;

use schema::{SchemaError, SchemaSnapshot};
use thiserror::Error;

pub use catalog::EndpointCatalog;
pub use helpers::HelperRegistry;
pub use types::SchemaRegistry;

/// Errors raised when querying a registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// No definition of that kind has the given name
    #[error("{kind} `{name}` not found")]
    NotFound {
        /// Definition kind (endpoint, helper, type)
        kind: &'static str,
        /// Requested name
        name: String,
    },

    /// A definition could not be registered
    #[error(transparent)]
    Schema(#[from] SchemaError),
}

/// Result type for registry queries
pub type Result<T> = std::result::Result<T, RegistryError>;

/// The three registries of one snapshot.
#[derive(Debug, Clone)]
pub struct Registries {
    /// Type definitions
    pub types: SchemaRegistry,
    /// Endpoints
    pub endpoints: EndpointCatalog,
    /// Helpers
    pub helpers: HelperRegistry,
    wire_version: String,
}

impl Registries {
    /// Build all registries from a snapshot. Duplicate names are schema errors.
    pub fn from_snapshot(snapshot: &SchemaSnapshot) -> std::result::Result<Self, SchemaError> {
        Ok(Self {
            types: SchemaRegistry::from_definitions(snapshot.types())?,
            endpoints: EndpointCatalog::from_definitions(snapshot.endpoints())?,
            helpers: HelperRegistry::from_definitions(snapshot.helpers())?,
            wire_version: snapshot.wire_version().to_string(),
        })
    }

    /// Wire version every request must carry.
    pub fn wire_version(&self) -> &str { &self.wire_version }
}
