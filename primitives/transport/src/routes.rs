//! Mock route table
//!
//! The table is derived from the catalog's example pairs only: one route per
//! operation selector, each holding the literal canonical response text.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{Result, TransportError};

/// One routed operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MockRoute {
    /// Operation selector value
    pub dispatch_key: String,
    /// Canonical endpoint name
    pub endpoint: String,
    /// Literal response text served for this selector
    pub response: String,
    /// Parameters a strict server requires in the request
    #[serde(default)]
    pub required_params: Vec<String>,
}

/// Route table served by the mock server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteTable {
    wire_version: String,
    schema_hash: String,
    routes: Vec<MockRoute>,
}

impl RouteTable {
    /// Build a table. Later routes with an already used selector are ignored.
    pub fn new(
        wire_version: impl Into<String>,
        schema_hash: impl Into<String>,
        routes: Vec<MockRoute>,
    ) -> Self {
        let mut seen = std::collections::BTreeSet::new();
        let routes = routes.into_iter().filter(|r| seen.insert(r.dispatch_key.clone())).collect();
        Self { wire_version: wire_version.into(), schema_hash: schema_hash.into(), routes }
    }

    /// Wire version requests are expected to carry.
    pub fn wire_version(&self) -> &str { &self.wire_version }

    /// Content hash of the snapshot the table was derived from.
    pub fn schema_hash(&self) -> &str { &self.schema_hash }

    /// Routes in catalog order.
    pub fn routes(&self) -> &[MockRoute] { &self.routes }

    /// Route for a selector.
    pub fn get(&self, dispatch_key: &str) -> Option<&MockRoute> {
        self.routes.iter().find(|r| r.dispatch_key == dispatch_key)
    }

    /// Number of routes.
    pub fn len(&self) -> usize { self.routes.len() }

    /// Whether the table has no routes.
    pub fn is_empty(&self) -> bool { self.routes.is_empty() }

    /// Pretty JSON encoding (the `mock/routes.json` artifact).
    pub fn to_json_pretty(&self) -> Result<String> { Ok(serde_json::to_string_pretty(self)?) }

    /// Parse a table from JSON text.
    pub fn from_json_str(text: &str) -> Result<Self> { Ok(serde_json::from_str(text)?) }

    /// Load a table from disk.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| TransportError::Io(format!("{}: {}", path.display(), e)))?;
        Self::from_json_str(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn route(key: &str, response: &str) -> MockRoute {
        MockRoute {
            dispatch_key: key.to_string(),
            endpoint: key.to_string(),
            response: response.to_string(),
            required_params: vec!["Blockchain".to_string()],
        }
    }

    #[test]
    fn test_first_route_wins() {
        let table = RouteTable::new(
            "2.0.0-alpha.1",
            "abc",
            vec![route("getBlockCount", "first"), route("getBlockCount", "second")],
        );
        assert_eq!(table.len(), 1);
        assert_eq!(table.get("getBlockCount").map(|r| r.response.as_str()), Some("first"));
        assert!(table.get("missing").is_none());
    }

    #[test]
    fn test_file_roundtrip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("routes.json");
        let table = RouteTable::new("2.0.0-alpha.1", "abc", vec![route("getAsset", "{}")]);
        std::fs::write(&path, table.to_json_pretty().expect("encode")).expect("write");
        assert_eq!(RouteTable::from_file(&path).expect("load"), table);
        assert!(matches!(
            RouteTable::from_file(&dir.path().join("absent.json")),
            Err(TransportError::Io(_))
        ));
    }
}
