//! Endpoint Catalog

use std::collections::BTreeMap;

use schema::{EndpointDefinition, SchemaError};

use crate::{RegistryError, Result};

/// The API operations of one snapshot, in authoring order.
#[derive(Debug, Clone, Default)]
pub struct EndpointCatalog {
    endpoints: Vec<EndpointDefinition>,
    by_name: BTreeMap<String, usize>,
    by_dispatch_key: BTreeMap<String, usize>,
}

impl EndpointCatalog {
    /// Build a catalog. Duplicate names or dispatch keys are schema errors.
    pub fn from_definitions(defs: &[EndpointDefinition]) -> std::result::Result<Self, SchemaError> {
        let mut catalog = Self::default();
        for (index, def) in defs.iter().enumerate() {
            if catalog.by_name.insert(def.name.clone(), index).is_some() {
                return Err(SchemaError::Duplicate { kind: "endpoint", name: def.name.clone() });
            }
            if catalog.by_dispatch_key.insert(def.dispatch_key.clone(), index).is_some() {
                return Err(SchemaError::Duplicate {
                    kind: "dispatch key",
                    name: def.dispatch_key.clone(),
                });
            }
            catalog.endpoints.push(def.clone());
        }
        Ok(catalog)
    }

    /// Endpoints in authoring order, optionally restricted to one category.
    pub fn list(&self, category: Option<&str>) -> Vec<&EndpointDefinition> {
        self.endpoints.iter().filter(|e| category.map_or(true, |c| e.category == c)).collect()
    }

    /// Look up an endpoint by canonical name.
    pub fn get(&self, name: &str) -> Result<&EndpointDefinition> {
        self.by_name
            .get(name)
            .map(|&i| &self.endpoints[i])
            .ok_or_else(|| RegistryError::NotFound { kind: "endpoint", name: name.to_string() })
    }

    /// Look up an endpoint by the operation selector carried on the wire.
    pub fn by_dispatch_key(&self, key: &str) -> Option<&EndpointDefinition> {
        self.by_dispatch_key.get(key).map(|&i| &self.endpoints[i])
    }

    /// Distinct categories in order of first appearance.
    pub fn categories(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for e in &self.endpoints {
            if !seen.contains(&e.category.as_str()) {
                seen.push(&e.category);
            }
        }
        seen
    }

    /// Iterate all endpoints in authoring order.
    pub fn iter(&self) -> impl Iterator<Item = &EndpointDefinition> { self.endpoints.iter() }

    /// Number of endpoints.
    pub fn len(&self) -> usize { self.endpoints.len() }

    /// Whether the catalog is empty.
    pub fn is_empty(&self) -> bool { self.endpoints.is_empty() }
}
