//! Pipeline orchestration for the main entry points.
//!
//! `validate` checks a snapshot (and its baseline) without writing anything.
//! `generate` validates, writes the shared artifacts, then generates every
//! target on its own scoped thread and installs each one that succeeded.

use std::any::Any;
use std::fs;
use std::path::Path;
use std::thread;

use analysis::{analyze, audit_surface, Analysis};
use codegen::{
    build_route_table, generate_sdk, openapi_artifact, route_table_artifact, verify_route_table,
    GeneratedArtifact, GenerationContext, GenerationError,
};
use schema::SchemaSnapshot;
use testgen::generate_test_artifacts;
use types::TargetLanguage;

use crate::options::PipelineOptions;
use crate::report::{RunReport, TargetOutcome};
use crate::staging::{clear_staging, install_shared, install_target};
use crate::{PipelineError, Result};

/// Load a snapshot file.
pub fn load_snapshot(path: &Path) -> Result<SchemaSnapshot> {
    tracing::debug!(path = %path.display(), "loading schema snapshot");
    Ok(SchemaSnapshot::from_file(path)?)
}

fn load_inputs(options: &PipelineOptions) -> Result<(SchemaSnapshot, Option<SchemaSnapshot>)> {
    let current = load_snapshot(&options.schema_path)?;
    let baseline = options.baseline_path.as_deref().map(load_snapshot).transpose()?;
    Ok((current, baseline))
}

/// Validate the snapshot and, with a baseline, classify the changes.
pub fn validate(options: &PipelineOptions) -> Result<Analysis> {
    let (current, baseline) = load_inputs(options)?;
    let analysis = analyze(&current, baseline.as_ref(), options.acknowledge_breaking)?;
    tracing::info!(
        version = current.schema_version(),
        endpoints = analysis.registries.endpoints.len(),
        helpers = analysis.registries.helpers.len(),
        "schema is valid"
    );
    Ok(analysis)
}

/// Create the output directory and drop leftovers of an interrupted run.
pub fn prepare_output_dir(out_dir: &Path) -> Result<()> {
    fs::create_dir_all(out_dir)?;
    clear_staging(out_dir)?;
    Ok(())
}

/// Render every artifact of one target and audit the rendered SDK.
pub fn generate_target(
    ctx: &GenerationContext,
    target: TargetLanguage,
) -> std::result::Result<Vec<GeneratedArtifact>, Vec<GenerationError>> {
    let (model, sdk) = generate_sdk(ctx, target)?;
    let missing = audit_surface(&[(target, sdk.content.as_str())], ctx.registries());
    if !missing.is_empty() {
        return Err(missing);
    }
    let mut artifacts = vec![sdk];
    artifacts.extend(generate_test_artifacts(ctx, &model).map_err(|e| vec![e])?);
    Ok(artifacts)
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

fn run_target(
    ctx: &GenerationContext,
    out_dir: &Path,
    target: TargetLanguage,
) -> std::result::Result<TargetOutcome, Vec<GenerationError>> {
    tracing::info!(%target, "generating target");
    let artifacts = generate_target(ctx, target)?;
    let files = install_target(out_dir, target, &artifacts)
        .map_err(|e| vec![GenerationError::Io { target, message: e.to_string() }])?;
    tracing::info!(%target, files = files.len(), "target finished");
    Ok(TargetOutcome { target, files })
}

/// Run the whole pipeline.
///
/// Schema problems, unacknowledged breaking changes and a diverging route
/// table stop the run with an error. Target failures are collected into the
/// returned report after every target was attempted.
pub fn generate(options: &PipelineOptions) -> Result<RunReport> {
    let (current, baseline) = load_inputs(options)?;
    let Analysis { regression, .. } = analyze(&current, baseline.as_ref(), options.acknowledge_breaking)?;
    let ctx = GenerationContext::from_frozen(current.freeze()?)?;

    let table = build_route_table(&ctx);
    verify_route_table(&table, &ctx.registries().endpoints).map_err(PipelineError::MockMismatch)?;

    prepare_output_dir(&options.output_dir)?;
    let shared = install_shared(&options.output_dir, &[openapi_artifact(&ctx)?, route_table_artifact(&ctx)?])?;

    let results: Vec<(TargetLanguage, std::result::Result<TargetOutcome, Vec<GenerationError>>)> =
        thread::scope(|scope| {
            let handles: Vec<_> = options
                .targets
                .iter()
                .map(|&target| {
                    let ctx = &ctx;
                    let out_dir = options.output_dir.as_path();
                    (target, scope.spawn(move || run_target(ctx, out_dir, target)))
                })
                .collect();
            handles
                .into_iter()
                .map(|(target, handle)| {
                    let outcome = handle.join().unwrap_or_else(|payload| {
                        Err(vec![GenerationError::Panicked { target, message: panic_message(payload) }])
                    });
                    (target, outcome)
                })
                .collect()
        });

    let mut report = RunReport {
        schema_version: ctx.snapshot().schema_version().to_string(),
        schema_hash: ctx.schema_hash().to_string(),
        regression,
        shared,
        ..RunReport::default()
    };
    for (target, outcome) in results {
        match outcome {
            Ok(outcome) => report.succeeded.push(outcome),
            Err(errors) => {
                for e in &errors {
                    tracing::warn!(%target, error = %e, "generation failed");
                }
                report.failures.extend(errors);
            }
        }
    }
    clear_staging(&options.output_dir)?;
    Ok(report)
}
