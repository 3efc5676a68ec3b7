//! Versioned schema snapshots
//!
//! A [`SchemaSnapshot`] is what authors write. Before any generation it is
//! [frozen](SchemaSnapshot::freeze) into a [`FrozenSnapshot`]: an `Arc`-shared,
//! immutable value tagged with the SHA-256 of its canonical JSON encoding.

use std::fs;
use std::ops::Deref;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::definitions::{EndpointDefinition, HelperDefinition, TypeDefinition};
use crate::error::{Result, SchemaError};

/// The canonical description of the wallet API at one version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaSnapshot {
    /// Schema version (semver)
    schema_version: String,
    /// Wire protocol version sent as `Version` in every request
    wire_version: String,
    /// Free-form description
    #[serde(default)]
    description: String,
    /// Type definitions, in authoring order
    #[serde(default)]
    types: Vec<TypeDefinition>,
    /// Endpoint definitions, in authoring order
    #[serde(default)]
    endpoints: Vec<EndpointDefinition>,
    /// Helper definitions, in authoring order
    #[serde(default)]
    helpers: Vec<HelperDefinition>,
}

impl SchemaSnapshot {
    /// Create a snapshot from its parts.
    pub fn new(
        schema_version: impl Into<String>,
        wire_version: impl Into<String>,
        types: Vec<TypeDefinition>,
        endpoints: Vec<EndpointDefinition>,
        helpers: Vec<HelperDefinition>,
    ) -> Self {
        Self {
            schema_version: schema_version.into(),
            wire_version: wire_version.into(),
            description: String::new(),
            types,
            endpoints,
            helpers,
        }
    }

    /// Schema version string.
    pub fn schema_version(&self) -> &str { &self.schema_version }

    /// Wire version string.
    pub fn wire_version(&self) -> &str { &self.wire_version }

    /// Description.
    pub fn description(&self) -> &str { &self.description }

    /// Type definitions.
    pub fn types(&self) -> &[TypeDefinition] { &self.types }

    /// Endpoint definitions.
    pub fn endpoints(&self) -> &[EndpointDefinition] { &self.endpoints }

    /// Helper definitions.
    pub fn helpers(&self) -> &[HelperDefinition] { &self.helpers }

    /// Decompose into owned parts (types, endpoints, helpers).
    pub fn into_parts(
        self,
    ) -> (Vec<TypeDefinition>, Vec<EndpointDefinition>, Vec<HelperDefinition>) {
        (self.types, self.endpoints, self.helpers)
    }

    /// Replace the schema version (used when deriving a successor snapshot).
    pub fn with_schema_version(mut self, version: impl Into<String>) -> Self {
        self.schema_version = version.into();
        self
    }

    /// Parse a snapshot from JSON text.
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| SchemaError::Parse(e.to_string()))
    }

    /// Load a snapshot from a JSON file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| SchemaError::Io { path: path.display().to_string(), message: e.to_string() })?;
        Self::from_json_str(&content)
    }

    /// Write the snapshot as pretty JSON.
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content =
            serde_json::to_string_pretty(self).map_err(|e| SchemaError::Parse(e.to_string()))?;
        fs::write(path, content)
            .map_err(|e| SchemaError::Io { path: path.display().to_string(), message: e.to_string() })
    }

    /// SHA-256 of the canonical JSON encoding, lowercase hex.
    pub fn content_hash(&self) -> Result<String> {
        let canonical = serde_json::to_string(self).map_err(|e| SchemaError::Parse(e.to_string()))?;
        let mut hasher = Sha256::new();
        hasher.update(canonical.as_bytes());
        Ok(format!("{:x}", hasher.finalize()))
    }

    /// Freeze the snapshot for a generation run.
    pub fn freeze(self) -> Result<FrozenSnapshot> {
        let hash = self.content_hash()?;
        Ok(FrozenSnapshot { inner: Arc::new(self), hash })
    }
}

/// An immutable, shareable snapshot with its content hash.
#[derive(Debug, Clone)]
pub struct FrozenSnapshot {
    inner: Arc<SchemaSnapshot>,
    hash: String,
}

impl FrozenSnapshot {
    /// Full content hash.
    pub fn hash(&self) -> &str { &self.hash }

    /// First twelve hex digits of the content hash, for file headers.
    pub fn short_hash(&self) -> &str { self.hash.get(..12).unwrap_or(&self.hash) }

    /// The shared snapshot.
    pub fn shared(&self) -> Arc<SchemaSnapshot> { Arc::clone(&self.inner) }
}

impl Deref for FrozenSnapshot {
    type Target = SchemaSnapshot;

    fn deref(&self) -> &Self::Target { &self.inner }
}

impl PartialEq for FrozenSnapshot {
    fn eq(&self, other: &Self) -> bool { self.hash == other.hash }
}
