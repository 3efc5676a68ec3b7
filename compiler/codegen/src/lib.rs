#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]

//! Code generation for the Circular wallet API.
//!
//! This crate turns one frozen schema snapshot into source text:
//!
//! - a typed [`ClientModel`] per target, in which every identifier and type
//!   token comes from the naming layer;
//! - one SDK source unit per target, formatted from that model by the
//!   target's [`SdkRenderer`];
//! - an OpenAPI 3.0 document of the whole catalog;
//! - the mock route table, derived from the example pairs only.
//!
//! Writing artifacts to disk, per-target isolation and test execution live in
//! companion crates.

pub mod artifact;
pub mod context;
pub mod error;
pub mod helpers;
pub mod mock;
pub mod model;
pub mod openapi;
pub mod targets;

pub use artifact::{clean_generated_source, ArtifactKind, GeneratedArtifact};
pub use context::GenerationContext;
pub use error::{GenerationError, MockMismatch};
pub use helpers::{emitter_for, HelperEmitter, HelperSnippet};
pub use mock::{build_route_table, route_table_artifact, verify_mock, verify_route_table, ROUTES_PATH};
pub use model::{ClientModel, ErrorCase, FieldModel, MethodModel, MethodSource, Normalizer, ParamModel};
pub use openapi::{openapi_artifact, OPENAPI_PATH};
pub use targets::{renderer_for, SdkRenderer};
use types::TargetLanguage;

/// Build the model of `target` and render its SDK artifact.
///
/// Every problem found while building the model is reported; no method is
/// dropped to make the rest render.
pub fn generate_sdk(
    ctx: &GenerationContext,
    target: TargetLanguage,
) -> Result<(ClientModel, GeneratedArtifact), Vec<GenerationError>> {
    let model = ClientModel::build(ctx, target)?;
    let content = renderer_for(target)
        .render(&model)
        .map_err(|e| vec![GenerationError::Render { target, message: e.to_string() }])?;
    tracing::debug!(%target, methods = model.methods.len(), "rendered sdk");
    let artifact = GeneratedArtifact::new(
        ArtifactKind::SdkClass,
        Some(target),
        format!("{}/{}", target.as_str(), target.sdk_file()),
        content,
        ctx.schema_hash(),
    );
    Ok((model, artifact))
}
