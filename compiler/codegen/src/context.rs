//! Shared, immutable input of one generation run

use std::sync::Arc;

use registry::Registries;
use schema::{FrozenSnapshot, SchemaError, SchemaSnapshot};

/// A frozen snapshot together with the registries built from it.
///
/// Cloning is cheap; every target task holds its own clone.
#[derive(Debug, Clone)]
pub struct GenerationContext {
    snapshot: FrozenSnapshot,
    registries: Arc<Registries>,
}

impl GenerationContext {
    /// Freeze `snapshot` and build its registries.
    pub fn new(snapshot: SchemaSnapshot) -> Result<Self, SchemaError> {
        Self::from_frozen(snapshot.freeze()?)
    }

    /// Build registries over an already frozen snapshot.
    pub fn from_frozen(snapshot: FrozenSnapshot) -> Result<Self, SchemaError> {
        let registries = Arc::new(Registries::from_snapshot(&snapshot)?);
        Ok(Self { snapshot, registries })
    }

    /// The snapshot.
    pub fn snapshot(&self) -> &FrozenSnapshot { &self.snapshot }

    /// Registries of the snapshot.
    pub fn registries(&self) -> &Registries { &self.registries }

    /// Content hash of the snapshot.
    pub fn schema_hash(&self) -> &str { self.snapshot.hash() }

    /// Wire version requests carry.
    pub fn wire_version(&self) -> &str { self.registries.wire_version() }
}
