//! Helper Registry

use std::collections::BTreeMap;

use schema::{HelperCategory, HelperDefinition, SchemaError};

use crate::{RegistryError, Result};

/// Helper definitions of one snapshot, in authoring order.
#[derive(Debug, Clone, Default)]
pub struct HelperRegistry {
    helpers: Vec<HelperDefinition>,
    by_name: BTreeMap<String, usize>,
}

impl HelperRegistry {
    /// Build a registry. Duplicate names are schema errors.
    pub fn from_definitions(defs: &[HelperDefinition]) -> std::result::Result<Self, SchemaError> {
        let mut registry = Self::default();
        for (index, def) in defs.iter().enumerate() {
            if registry.by_name.insert(def.name.clone(), index).is_some() {
                return Err(SchemaError::Duplicate { kind: "helper", name: def.name.clone() });
            }
            registry.helpers.push(def.clone());
        }
        Ok(registry)
    }

    /// Helpers in authoring order, optionally restricted to one category.
    pub fn list(&self, category: Option<HelperCategory>) -> Vec<&HelperDefinition> {
        self.helpers.iter().filter(|h| category.map_or(true, |c| h.category == c)).collect()
    }

    /// Look up a helper by canonical name.
    pub fn get(&self, name: &str) -> Result<&HelperDefinition> {
        self.by_name
            .get(name)
            .map(|&i| &self.helpers[i])
            .ok_or_else(|| RegistryError::NotFound { kind: "helper", name: name.to_string() })
    }

    /// Whether a helper named `name` exists.
    pub fn contains(&self, name: &str) -> bool { self.by_name.contains_key(name) }

    /// Iterate all helpers in authoring order.
    pub fn iter(&self) -> impl Iterator<Item = &HelperDefinition> { self.helpers.iter() }

    /// Number of helpers.
    pub fn len(&self) -> usize { self.helpers.len() }

    /// Whether there are no helpers.
    pub fn is_empty(&self) -> bool { self.helpers.is_empty() }
}
