//! # Remote Tasks
//!
//! Tasks over catalog URLs hosted outside the local store. Every URL is
//! fetched in turn; failures are logged and never change the exit code.
//!
//! ```bash
//! schemagate remote census
//! schemagate remote links --timeout-secs 10
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};

use schemagate_remote::{check_links, FetchConfig, RemoteFetcher};
use schemagate_scan::BomCheck;
use schemagate_schema::{ConformanceHarness, DialectCensus};

use crate::workspace::Workspace;

/// Remote subcommand arguments.
#[derive(Args, Debug)]
pub struct RemoteArgs {
    #[command(subcommand)]
    pub command: RemoteCommand,

    /// Per-request timeout in seconds.
    #[arg(long, default_value_t = 30, global = true)]
    pub timeout_secs: u64,
}

/// Available remote subcommands.
#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteCommand {
    /// Count remote schemas per dialect.
    Census,
    /// Check remote schemas for byte-order marks.
    Bom,
    /// Compile remote schemas with the strict dispatch.
    Compile,
    /// Check that every remote URL answers with parseable JSON.
    Links,
}

/// Execute the remote subcommand.
pub fn run_remote(args: &RemoteArgs, root: &Path) -> Result<u8> {
    let ws = Workspace::open(root)?;
    let (catalog, _) = ws.catalog()?;
    let urls = catalog.remote_urls();
    tracing::info!("{} remote catalog URLs", urls.len());

    let fetcher = RemoteFetcher::new(&FetchConfig {
        timeout_secs: args.timeout_secs,
    })?;
    let runtime = tokio::runtime::Runtime::new().context("failed to start async runtime")?;

    let summary = match args.command {
        RemoteCommand::Census => {
            let mut census = DialectCensus::new();
            runtime.block_on(fetcher.fetch_each(&urls, &mut census))
        }
        RemoteCommand::Bom => {
            let mut check = BomCheck::default();
            runtime.block_on(fetcher.fetch_each(&urls, &mut check))
        }
        RemoteCommand::Compile => {
            let mut harness = ConformanceHarness::schemas_only(&ws.corpus, &ws.config);
            runtime.block_on(fetcher.fetch_each(&urls, &mut harness))
        }
        RemoteCommand::Links => {
            runtime.block_on(check_links(&fetcher, &urls));
            return Ok(0);
        }
    };
    tracing::info!(
        "Remote pass done: {} fetched, {} skipped, {} rejected",
        summary.fetched,
        summary.skipped,
        summary.rejected
    );
    Ok(0)
}
