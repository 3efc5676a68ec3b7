//! Command-line arguments.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use types::TargetLanguage;

/// Orbit: SDKs, tests and a mock server from one schema snapshot.
#[derive(Debug, Parser)]
#[command(name = "orbit", version, about)]
pub struct Cli {
    /// Configuration file (default: the user config path, when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level or filter directive; `RUST_LOG` takes precedence
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Subcommand
    #[command(subcommand)]
    pub command: Command,
}

/// Schema inputs shared by every subcommand.
#[derive(Debug, Clone, Default, Args)]
pub struct SchemaArgs {
    /// Current schema snapshot
    #[arg(long)]
    pub schema: Option<PathBuf>,

    /// Previous release snapshot, for regression checking
    #[arg(long)]
    pub baseline: Option<PathBuf>,

    /// Accept breaking changes against the baseline
    #[arg(long)]
    pub acknowledge_breaking: bool,
}

/// Output selection shared by `generate` and `run-tests`.
#[derive(Debug, Clone, Default, Args)]
pub struct OutputArgs {
    /// Root of the generated tree
    #[arg(long, short)]
    pub out: Option<PathBuf>,

    /// Target to process; repeat for several (default: configured targets)
    #[arg(long = "target", short)]
    pub targets: Vec<TargetLanguage>,
}

/// Subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Generate SDKs, test suites, the mock route table and the OpenAPI document
    Generate {
        /// Schema inputs
        #[command(flatten)]
        schema: SchemaArgs,
        /// Output selection
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Validate a snapshot and classify changes against a baseline
    Validate {
        /// Schema inputs
        #[command(flatten)]
        schema: SchemaArgs,
    },
    /// Run one test tier (1 contract, 2 unit, 3 integration, 4 parity and regression)
    RunTests {
        /// Tier number
        #[arg(long, value_parser = clap::value_parser!(u8).range(1..=4))]
        tier: u8,
        /// Schema inputs
        #[command(flatten)]
        schema: SchemaArgs,
        /// Output selection
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Serve the mock route table until interrupted
    ServeMock {
        /// Schema inputs
        #[command(flatten)]
        schema: SchemaArgs,
        /// Port to bind on 127.0.0.1 (default: configured port)
        #[arg(long)]
        port: Option<u16>,
        /// Reject foreign versions and missing required parameters
        #[arg(long)]
        strict: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_generate_targets() {
        let cli = Cli::try_parse_from(["orbit", "generate", "-t", "python", "--target", "go", "--out", "gen"])
            .expect("parse");
        let Command::Generate { output, schema } = cli.command else { panic!("generate") };
        assert_eq!(output.targets, vec![TargetLanguage::Python, TargetLanguage::Go]);
        assert_eq!(output.out, Some(PathBuf::from("gen")));
        assert!(!schema.acknowledge_breaking);
    }

    #[test]
    fn test_tier_range() {
        assert!(Cli::try_parse_from(["orbit", "run-tests", "--tier", "4"]).is_ok());
        assert!(Cli::try_parse_from(["orbit", "run-tests", "--tier", "5"]).is_err());
        assert!(Cli::try_parse_from(["orbit", "run-tests"]).is_err());
    }

    #[test]
    fn test_unknown_target_is_rejected() {
        assert!(Cli::try_parse_from(["orbit", "generate", "--target", "cobol"]).is_err());
    }
}
