//! Subcommand implementations.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use codegen::{build_route_table, GenerationContext};
use config::Config;
use mock::{MockOptions, MockServer};
use pipeline::{load_snapshot, PipelineOptions};
use schema::EndpointDefinition;
use testgen::{
    run_contract_tier, run_integration_tier, run_parity, run_regression_tier, run_unit_tier, CommandDriver,
    ParityRunner, SdkDriver, Tier, TierReport, TransportDriver,
};

use crate::args::{Cli, Command, OutputArgs, SchemaArgs};
use crate::{CliError, Result};

/// How a command ended once it could report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Everything succeeded
    Success,
    /// Something failed; the summary was printed
    Failure,
}

impl Outcome {
    fn from_success(success: bool) -> Self { if success { Outcome::Success } else { Outcome::Failure } }

    /// Process exit code.
    pub fn exit_code(self) -> ExitCode {
        match self {
            Outcome::Success => ExitCode::SUCCESS,
            Outcome::Failure => ExitCode::FAILURE,
        }
    }
}

/// Load configuration, install logging and run the subcommand.
pub async fn run(cli: Cli) -> Result<Outcome> {
    let config = Config::load(cli.config.as_deref())?;
    let level = cli.log_level.clone().unwrap_or_else(|| config.logging.level.clone());
    logging::init(&level, config.logging.file.as_deref())?;
    tracing::debug!(command = ?cli.command, "starting");

    match cli.command {
        Command::Generate { schema, output } => generate(&config, &schema, &output).await,
        Command::Validate { schema } => validate(&config, &schema),
        Command::RunTests { tier, schema, output } => run_tests(&config, tier, &schema, &output).await,
        Command::ServeMock { schema, port, strict } => serve_mock(&config, &schema, port, strict).await,
    }
}

/// Configured options with command-line overrides applied.
fn options(config: &Config, schema: &SchemaArgs, output: Option<&OutputArgs>) -> PipelineOptions {
    let mut options = PipelineOptions::from_config(config);
    if let Some(path) = &schema.schema {
        options.schema_path = path.clone();
    }
    if schema.baseline.is_some() {
        options.baseline_path = schema.baseline.clone();
    }
    options.acknowledge_breaking |= schema.acknowledge_breaking;
    if let Some(output) = output {
        if let Some(out) = &output.out {
            options.output_dir = out.clone();
        }
        if !output.targets.is_empty() {
            options.targets.clear();
            for t in &output.targets {
                if !options.targets.contains(t) {
                    options.targets.push(*t);
                }
            }
        }
    }
    options
}

fn context(options: &PipelineOptions) -> Result<GenerationContext> {
    let snapshot = load_snapshot(&options.schema_path)?;
    Ok(GenerationContext::from_frozen(snapshot.freeze()?)?)
}

async fn generate(config: &Config, schema: &SchemaArgs, output: &OutputArgs) -> Result<Outcome> {
    let options = options(config, schema, Some(output));
    let report = tokio::task::spawn_blocking(move || pipeline::generate(&options))
        .await
        .map_err(|e| CliError::Message(format!("generation task failed: {}", e)))??;
    print!("{}", report);
    Ok(Outcome::from_success(report.is_success()))
}

fn validate(config: &Config, schema: &SchemaArgs) -> Result<Outcome> {
    let options = options(config, schema, None);
    let analysis = pipeline::validate(&options)?;
    let registries = &analysis.registries;
    println!(
        "{}: valid ({} types, {} endpoints, {} helpers)",
        options.schema_path.display(),
        registries.types.len(),
        registries.endpoints.len(),
        registries.helpers.len()
    );
    if let Some(regression) = &analysis.regression {
        println!("regression {} -> {}: {}", regression.previous, regression.current, regression.state);
        for change in &regression.changes {
            println!("  {}", change);
        }
    }
    Ok(Outcome::Success)
}

/// Endpoints the parity tier exercises; all of them when none are configured.
fn parity_endpoints(ctx: &GenerationContext, config: &Config) -> Result<Vec<EndpointDefinition>> {
    let wanted = &config.testing.parity_endpoints;
    if wanted.is_empty() {
        return Ok(ctx.snapshot().endpoints().to_vec());
    }
    wanted
        .iter()
        .map(|name| {
            ctx.registries()
                .endpoints
                .get(name)
                .cloned()
                .map_err(|e| CliError::Message(format!("parity endpoint: {}", e)))
        })
        .collect()
}

async fn run_tier(
    tier: Tier,
    config: &Config,
    options: &PipelineOptions,
    ctx: &GenerationContext,
) -> Result<TierReport> {
    let mock_options = MockOptions { strict: config.testing.strict_requests };
    let out_dir: PathBuf = options.output_dir.clone();
    let report = match tier {
        Tier::Contract => run_contract_tier(ctx.registries()),
        Tier::Unit => {
            let targets = options.targets.clone();
            let timeout = config.testing.suite_timeout();
            tokio::task::spawn_blocking(move || run_unit_tier(&out_dir, &targets, timeout))
                .await
                .map_err(testgen::TestgenError::from)?
        }
        Tier::Integration =>
            run_integration_tier(
                &out_dir,
                &options.targets,
                build_route_table(ctx),
                mock_options,
                config.testing.suite_timeout(),
            )
            .await?,
        Tier::Parity => {
            let timeout = config.testing.parity_timeout();
            let mut drivers: Vec<Arc<dyn SdkDriver>> = vec![Arc::new(TransportDriver::new(ctx.wire_version()))];
            for target in &options.targets {
                drivers.push(Arc::new(CommandDriver::new(*target, &out_dir, timeout)));
            }
            let runner = ParityRunner::new(drivers, timeout);
            let endpoints = parity_endpoints(ctx, config)?;
            run_parity(build_route_table(ctx), mock_options, &runner, &endpoints).await?.to_tier_report()
        }
        Tier::Regression => match &options.baseline_path {
            Some(path) => {
                let previous = load_snapshot(path)?;
                run_regression_tier(&previous, ctx.snapshot(), options.acknowledge_breaking)
            }
            None => {
                let mut report = TierReport::new(Tier::Regression);
                report.skip();
                report
            }
        },
    };
    Ok(report)
}

async fn run_tests(config: &Config, tier: u8, schema: &SchemaArgs, output: &OutputArgs) -> Result<Outcome> {
    let tiers = Tier::from_number(tier).ok_or_else(|| CliError::Message(format!("no tier {}", tier)))?;
    let options = options(config, schema, Some(output));
    let ctx = context(&options)?;

    let mut success = true;
    for tier in tiers {
        let report = run_tier(tier, config, &options, &ctx).await?;
        println!("{}", report);
        success &= report.is_success();
    }
    Ok(Outcome::from_success(success))
}

async fn serve_mock(config: &Config, schema: &SchemaArgs, port: Option<u16>, strict: bool) -> Result<Outcome> {
    let options = options(config, schema, None);
    let ctx = context(&options)?;
    let addr = SocketAddr::from(([127, 0, 0, 1], port.unwrap_or(config.testing.mock_port)));
    let mock_options = MockOptions { strict: strict || config.testing.strict_requests };

    let server = MockServer::start(build_route_table(&ctx), mock_options, addr).await?;
    println!("serving {} endpoint(s) at {}", ctx.registries().endpoints.len(), server.url());
    tokio::signal::ctrl_c().await?;
    tracing::info!("interrupted, stopping mock server");
    server.shutdown().await?;
    Ok(Outcome::Success)
}
