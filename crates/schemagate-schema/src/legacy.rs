//! # Legacy Engine Harness
//!
//! Schemas listed under `legacyEngine` predate strict validation. They
//! are compiled as draft-04 with unknown keywords and formats ignored,
//! and only their positive fixtures are checked. Fixtures are collected
//! per folder and validated as a batch when the folder closes.

use schemagate_core::{
    AssertionFailure, AssertionKind, Corpus, FixtureRecord, GateError, SchemaRecord, Storage,
    ValidationConfig,
};
use schemagate_scan::ScanVisitor;

use crate::dispatch::{build_legacy_validator, CompiledValidator, Outcome, Quirks};

/// Lenient draft-04 visitor for the legacy partition.
pub struct LegacyHarness<'a, S: Storage> {
    corpus: &'a Corpus<S>,
    config: &'a ValidationConfig,
    pending: Vec<FixtureRecord>,
    /// Schemas compiled in the schema stage.
    pub schemas: usize,
    /// Positive fixtures that validated.
    pub positive_passed: usize,
}

impl<'a, S: Storage> LegacyHarness<'a, S> {
    /// Create a harness over `corpus` with the overlay's quirks.
    pub fn new(corpus: &'a Corpus<S>, config: &'a ValidationConfig) -> Self {
        Self {
            corpus,
            config,
            pending: Vec::new(),
            schemas: 0,
            positive_passed: 0,
        }
    }

    fn compile(&self, record: &SchemaRecord) -> Result<CompiledValidator, GateError> {
        let document = record.parse()?;
        let quirks = Quirks::resolve(&self.config.options_for(&record.file_name), self.corpus)?;
        build_legacy_validator(&document, &quirks).map_err(|e| {
            tracing::error!("legacy compile | {} | {e}", record.location);
            GateError::Compile {
                location: record.location.clone(),
                dialect: "draft-04 (legacy)".to_string(),
                reason: e.to_string(),
            }
        })
    }
}

impl<S: Storage> ScanVisitor for LegacyHarness<'_, S> {
    fn schema(&mut self, record: &SchemaRecord) -> Result<(), GateError> {
        self.compile(record)?;
        self.schemas += 1;
        tracing::info!("pass schema (legacy) | {}", record.location);
        Ok(())
    }

    fn schema_done(&mut self) -> Result<(), GateError> {
        tracing::info!("Total legacy schemas validated: {}", self.schemas);
        Ok(())
    }

    fn wants_positive(&self) -> bool {
        true
    }

    fn folder_schema(&mut self, _schema: &SchemaRecord) -> Result<(), GateError> {
        self.pending.clear();
        Ok(())
    }

    fn positive(&mut self, _schema: &SchemaRecord, fixture: &FixtureRecord) -> Result<(), GateError> {
        self.pending.push(fixture.clone());
        Ok(())
    }

    fn positive_done(&mut self, schema: &SchemaRecord) -> Result<(), GateError> {
        let validator = self.compile(schema)?;
        for fixture in std::mem::take(&mut self.pending) {
            let fixture_path = fixture.path.display().to_string();
            let document = fixture.parse().map_err(|e| {
                tracing::error!("Error in parse test: {e}");
                e
            })?;
            match validator.check(&document) {
                Outcome::Valid => {
                    self.positive_passed += 1;
                    tracing::info!("pass positive test (legacy) | {fixture_path}");
                }
                Outcome::Invalid(violations) => {
                    let first = violations.first().cloned().unwrap_or_default();
                    tracing::error!("failed positive test (legacy) | {fixture_path}");
                    tracing::error!("{first}");
                    return Err(GateError::Assertion(AssertionFailure {
                        fixture: fixture_path,
                        schema: schema.location.clone(),
                        kind: AssertionKind::PositiveRejected {
                            schema_path: first.schema_path,
                            instance_path: first.instance_path,
                            message: first.message,
                        },
                    }));
                }
            }
        }
        Ok(())
    }
}
