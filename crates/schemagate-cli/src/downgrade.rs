//! # Downgrade Probe
//!
//! Maintenance task: reports schemas of the strict partition that would
//! also compile under an older dialect. Findings are informational.

use std::path::Path;

use anyhow::Result;
use clap::Args;

use schemagate_scan::{ScanOptions, Scanner};
use schemagate_schema::DowngradeScan;

use crate::workspace::Workspace;

/// Arguments of `schemagate downgrade`.
#[derive(Args, Debug)]
pub struct DowngradeArgs {
    /// Exit with status 2 when any schema could be downgraded.
    #[arg(long)]
    pub fail_on_findings: bool,
}

/// Execute the downgrade subcommand.
pub fn run_downgrade(args: &DowngradeArgs, root: &Path) -> Result<u8> {
    let ws = Workspace::open(root)?;
    let mut probe = DowngradeScan::new(&ws.corpus, &ws.config);
    Scanner::new(&ws.corpus, ScanOptions::strict_partition(&ws.config).with_folder_log(false))
        .run(&mut probe)?;
    if args.fail_on_findings && !probe.findings.is_empty() {
        return Ok(2);
    }
    Ok(0)
}
