//! # Local Checks
//!
//! `schemagate check` runs every local task in pipeline order and stops
//! at the first failure. `--only <task>` runs a single task.
//!
//! ```bash
//! schemagate check
//! schemagate check --only census
//! schemagate --root ./src check --only conformance
//! ```

use std::path::Path;

use anyhow::{bail, Context, Result};
use clap::{Args, ValueEnum};

use schemagate_core::{Dialect, GateError, Polarity};
use schemagate_scan::{
    positive_coverage, BomCheck, CatalogPresenceCheck, DuplicateKeyCheck, ExtensionCheck,
    ScanOptions, ScanVisitor, Scanner, SchemaKeywordCheck,
};
use schemagate_schema::{build_validator, ConformanceHarness, DialectCensus, LegacyHarness, Outcome, Quirks};

use crate::workspace::{Workspace, CATALOG_SCHEMA};

/// One local task.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum LocalTask {
    /// No duplicates in the overlay lists.
    Config,
    /// Schema entries are files, fixture entries are folders.
    Structure,
    /// Every corpus file name ends with `.json`.
    Extensions,
    /// The catalog satisfies its own schema.
    CatalogSchema,
    /// No fileMatch pattern is claimed twice.
    FileMatch,
    /// Local catalog URLs are well formed and point at existing files.
    CatalogUrls,
    /// Every schema file is listed in the catalog.
    SchemaInCatalog,
    /// Schema files carry no byte-order mark.
    Bom,
    /// Positive fixtures repeat no object key.
    DuplicateKeys,
    /// Every schema declares `$schema`.
    SchemaKeyword,
    /// Count schemas per dialect.
    Census,
    /// Report schemas without positive fixtures.
    Coverage,
    /// Legacy engine partition.
    Legacy,
    /// Strict conformance of schemas and fixtures.
    Conformance,
}

impl LocalTask {
    /// The `check` pipeline, in order.
    pub const PIPELINE: [LocalTask; 14] = [
        LocalTask::Config,
        LocalTask::Structure,
        LocalTask::Extensions,
        LocalTask::CatalogSchema,
        LocalTask::FileMatch,
        LocalTask::CatalogUrls,
        LocalTask::SchemaInCatalog,
        LocalTask::Bom,
        LocalTask::DuplicateKeys,
        LocalTask::SchemaKeyword,
        LocalTask::Census,
        LocalTask::Coverage,
        LocalTask::Legacy,
        LocalTask::Conformance,
    ];
}

/// Arguments of `schemagate check`.
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Run a single task instead of the whole pipeline.
    #[arg(long, value_enum)]
    pub only: Option<LocalTask>,
}

/// Execute the check subcommand.
pub fn run_check(args: &CheckArgs, root: &Path) -> Result<u8> {
    let ws = Workspace::open(root)?;
    match args.only {
        Some(task) => run_task(&ws, task)?,
        None => {
            for task in LocalTask::PIPELINE {
                run_task(&ws, task)?;
            }
            tracing::info!("All local checks passed");
        }
    }
    Ok(0)
}

/// Run one task against `ws`.
pub fn run_task(ws: &Workspace, task: LocalTask) -> Result<()> {
    tracing::debug!(?task, "running task");
    match task {
        LocalTask::Config => {
            ws.config.check_duplicates()?;
            tracing::info!("OK: no duplicates in {}", crate::workspace::CONFIG_FILE);
        }
        LocalTask::Structure => {
            ws.corpus.validate_structure()?;
            tracing::info!("OK: directory structure");
        }
        LocalTask::Extensions => {
            let mut check = ExtensionCheck::default();
            scan(ws, ScanOptions::full_with(&ws.config), &mut check)?;
            tracing::info!("OK: {} files have the .json extension", check.scanned);
        }
        LocalTask::CatalogSchema => catalog_schema(ws)?,
        LocalTask::FileMatch => {
            let (catalog, _) = ws.catalog()?;
            catalog.check_file_match_conflicts(&ws.config.file_match_conflict)?;
            tracing::info!("OK: no fileMatch conflicts");
        }
        LocalTask::CatalogUrls => {
            let (catalog, _) = ws.catalog()?;
            let schema_dir = &ws.corpus.layout().schema_dir;
            let count = catalog.check_local_urls(|file| schema_dir.join(file).is_file())?;
            tracing::info!("OK: {count} local catalog URLs");
        }
        LocalTask::SchemaInCatalog => {
            let (catalog, _) = ws.catalog()?;
            let mut check =
                CatalogPresenceCheck::new(catalog.local_file_names(), ws.config.missingcatalogurl.clone());
            scan(ws, ScanOptions::full_with(&ws.config), &mut check)?;
            tracing::info!("OK: {} schema files listed in the catalog", check.scanned);
        }
        LocalTask::Bom => {
            let mut check = BomCheck::default();
            scan(ws, ScanOptions::full_with(&ws.config), &mut check)?;
            tracing::info!("OK: {} schema files without BOM", check.scanned);
        }
        LocalTask::DuplicateKeys => {
            let mut check = DuplicateKeyCheck::default();
            scan(ws, ScanOptions::full_with(&ws.config), &mut check)?;
            tracing::info!("OK: {} positive fixtures without duplicate keys", check.scanned);
        }
        LocalTask::SchemaKeyword => {
            let mut check = SchemaKeywordCheck::default();
            scan(ws, ScanOptions::full_with(&ws.config), &mut check)?;
            tracing::info!("OK: {} schema files declare $schema", check.scanned);
        }
        LocalTask::Census => {
            let mut census = DialectCensus::new();
            scan(ws, ScanOptions::full_with(&ws.config), &mut census)?;
            tracing::debug!(total = census.total(), "census complete");
        }
        LocalTask::Coverage => {
            let coverage = positive_coverage(&ws.corpus)?;
            for file in &coverage.missing {
                tracing::info!("Schema without positive test: {file}");
            }
            tracing::info!(
                "{} of {} schemas ({:.1}%) have no {} fixtures",
                coverage.missing.len(),
                coverage.total,
                coverage.missing_percent(),
                Polarity::Positive
            );
        }
        LocalTask::Legacy => {
            let mut harness = LegacyHarness::new(&ws.corpus, &ws.config);
            scan(ws, ScanOptions::legacy_partition(&ws.config), &mut harness)?;
        }
        LocalTask::Conformance => {
            let mut harness = ConformanceHarness::new(&ws.corpus, &ws.config);
            scan(ws, ScanOptions::strict_partition(&ws.config), &mut harness)?;
            tracing::info!(
                "Conformance passed: {} schemas, {} positive, {} negative",
                harness.report.schemas,
                harness.report.positive_passed,
                harness.report.negative_passed
            );
        }
    }
    Ok(())
}

fn scan(ws: &Workspace, options: ScanOptions, visitor: &mut dyn ScanVisitor) -> Result<(), GateError> {
    Scanner::new(&ws.corpus, options).run(visitor).map(|_| ())
}

fn catalog_schema(ws: &Workspace) -> Result<()> {
    let (_, raw) = ws.catalog()?;
    let schema = ws
        .corpus
        .read_schema(CATALOG_SCHEMA)?
        .parse()
        .context("catalog schema is not valid JSON")?;
    let validator = build_validator(Some(Dialect::Draft04), &schema, &Quirks::default())
        .context("catalog schema does not compile")?;
    match validator.check(&raw) {
        Outcome::Valid => {
            tracing::info!("OK: catalog matches {CATALOG_SCHEMA}");
            Ok(())
        }
        Outcome::Invalid(violations) => {
            for violation in violations.iter() {
                tracing::error!("catalog: {violation}");
            }
            bail!("catalog does not match {CATALOG_SCHEMA}")
        }
    }
}
