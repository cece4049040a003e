//! # schemagate CLI entry point
//!
//! Parses command-line arguments, installs the tracing subscriber and
//! dispatches to subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use schemagate_cli::check::{run_check, CheckArgs};
use schemagate_cli::downgrade::{run_downgrade, DowngradeArgs};
use schemagate_cli::remote::{run_remote, RemoteArgs};

/// Conformance gate for a JSON Schema store.
///
/// Checks corpus hygiene and catalog consistency, counts schemas per
/// dialect, validates positive and negative fixtures, and probes schemas
/// for older compatible dialects.
#[derive(Parser, Debug)]
#[command(name = "schemagate", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Store root holding `schemas/`, `test/` and `negative_test/`.
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the local check pipeline, or one task of it.
    Check(CheckArgs),

    /// Report schemas that also compile under an older dialect.
    Downgrade(DowngradeArgs),

    /// Tasks over remotely hosted catalog schemas.
    Remote(RemoteArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let root = cli
        .root
        .clone()
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));
    tracing::debug!(root = %root.display(), "resolved store root");

    let result = match &cli.command {
        Commands::Check(args) => run_check(args, &root),
        Commands::Downgrade(args) => run_downgrade(args, &root),
        Commands::Remote(args) => run_remote(args, &root),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}
