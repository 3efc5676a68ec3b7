//! Mock route table generation and verification
//!
//! Routes are derived from the catalog's example pairs only. The stored
//! response is [`EndpointDefinition::response_text`], the one function every
//! consumer of the canonical response calls.

use registry::EndpointCatalog;
use schema::EndpointDefinition;
use transport::{MockRoute, RouteTable, TransportError};

use crate::artifact::{ArtifactKind, GeneratedArtifact};
use crate::context::GenerationContext;
use crate::error::MockMismatch;

/// Relative path of the route table artifact.
pub const ROUTES_PATH: &str = "mock/routes.json";

fn route(endpoint: &EndpointDefinition) -> MockRoute {
    MockRoute {
        dispatch_key: endpoint.dispatch_key.clone(),
        endpoint: endpoint.name.clone(),
        response: endpoint.response_text(),
        required_params: endpoint.required_params().map(|p| p.name.clone()).collect(),
    }
}

/// Route table of the context's catalog.
pub fn build_route_table(ctx: &GenerationContext) -> RouteTable {
    RouteTable::new(
        ctx.wire_version(),
        ctx.schema_hash(),
        ctx.registries().endpoints.iter().map(route).collect(),
    )
}

/// Render the route table artifact.
pub fn route_table_artifact(ctx: &GenerationContext) -> Result<GeneratedArtifact, TransportError> {
    let table = build_route_table(ctx);
    Ok(GeneratedArtifact::new(
        ArtifactKind::MockServer,
        None,
        ROUTES_PATH,
        table.to_json_pretty()?,
        ctx.schema_hash(),
    ))
}

/// Compare what `serve` answers for each endpoint with its canonical response.
///
/// `serve` receives the endpoint and returns the served text, or `None` when
/// nothing was served.
pub fn verify_mock<F>(catalog: &EndpointCatalog, mut serve: F) -> Result<(), Vec<MockMismatch>>
where
    F: FnMut(&EndpointDefinition) -> Option<String>,
{
    let mismatches: Vec<MockMismatch> = catalog
        .iter()
        .filter_map(|endpoint| {
            let expected = endpoint.response_text();
            let served = serve(endpoint);
            (served.as_deref() != Some(expected.as_str())).then(|| MockMismatch {
                endpoint: endpoint.name.clone(),
                expected,
                served,
            })
        })
        .collect();
    if mismatches.is_empty() {
        Ok(())
    } else {
        Err(mismatches)
    }
}

/// Verify a route table against the catalog by lookup.
pub fn verify_route_table(
    table: &RouteTable,
    catalog: &EndpointCatalog,
) -> Result<(), Vec<MockMismatch>> {
    verify_mock(catalog, |endpoint| table.get(&endpoint.dispatch_key).map(|r| r.response.clone()))
}
