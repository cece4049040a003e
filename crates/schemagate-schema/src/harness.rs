//! # Conformance Harness
//!
//! Scan visitor compiling every schema with the strict dispatch and
//! checking fixture polarity: positive fixtures must validate, negative
//! fixtures must not. Any failure is logged in full and then aborts the
//! scan with an [`AssertionFailure`].

use schemagate_core::{
    AssertionFailure, AssertionKind, Corpus, Dialect, FixtureRecord, GateError, SchemaRecord,
    Storage, ValidationConfig,
};
use schemagate_scan::ScanVisitor;

use crate::dispatch::{build_validator, CompiledValidator, Outcome, Quirks, Violation};

/// Label used in logs for a schema without a recognised dialect.
pub(crate) fn dialect_label(dialect: Option<Dialect>) -> &'static str {
    dialect.map_or("unknown", Dialect::name)
}

/// Compile a schema record with the strict dispatch, logging failures.
pub fn compile_strict<S: Storage>(
    corpus: &Corpus<S>,
    config: &ValidationConfig,
    record: &SchemaRecord,
) -> Result<(Option<Dialect>, CompiledValidator), GateError> {
    let document = record.parse().map_err(|e| {
        tracing::error!("compile | {} | {e}", record.location);
        e
    })?;
    let quirks = Quirks::resolve(&config.options_for(&record.file_name), corpus)?;
    let dialect = Dialect::classify(&document);
    let validator = build_validator(dialect, &document, &quirks).map_err(|e| {
        tracing::error!("compile | {} ({})", record.location, dialect_label(dialect));
        tracing::error!("{e}");
        GateError::Compile {
            location: record.location.clone(),
            dialect: dialect_label(dialect).to_string(),
            reason: e.to_string(),
        }
    })?;
    Ok((dialect, validator))
}

/// Counters kept by [`ConformanceHarness`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HarnessReport {
    /// Schemas compiled in the schema stage.
    pub schemas: usize,
    /// Positive fixtures that validated.
    pub positive_passed: usize,
    /// Negative fixtures that were rejected.
    pub negative_passed: usize,
    /// First violation reported for the most recent rejected negative fixture.
    pub last_rejection: Option<Violation>,
}

/// Strict conformance visitor.
pub struct ConformanceHarness<'a, S: Storage> {
    corpus: &'a Corpus<S>,
    config: &'a ValidationConfig,
    current: Option<(String, CompiledValidator)>,
    with_fixtures: bool,
    /// Counters.
    pub report: HarnessReport,
}

impl<'a, S: Storage> ConformanceHarness<'a, S> {
    /// Compile schemas and check both fixture polarities.
    pub fn new(corpus: &'a Corpus<S>, config: &'a ValidationConfig) -> Self {
        Self {
            corpus,
            config,
            current: None,
            with_fixtures: true,
            report: HarnessReport::default(),
        }
    }

    /// Compile schemas only, as for remotely sourced documents.
    pub fn schemas_only(corpus: &'a Corpus<S>, config: &'a ValidationConfig) -> Self {
        Self {
            with_fixtures: false,
            ..Self::new(corpus, config)
        }
    }

    /// The validator of the folder being scanned, compiled on first use.
    fn validator_for(&mut self, schema: &SchemaRecord) -> Result<&CompiledValidator, GateError> {
        let entry = match self.current.take() {
            Some(entry) if entry.0 == schema.file_name => entry,
            _ => (
                schema.file_name.clone(),
                compile_strict(self.corpus, self.config, schema)?.1,
            ),
        };
        Ok(&self.current.insert(entry).1)
    }
}

impl<S: Storage> ScanVisitor for ConformanceHarness<'_, S> {
    fn schema(&mut self, record: &SchemaRecord) -> Result<(), GateError> {
        let (dialect, _) = compile_strict(self.corpus, self.config, record)?;
        self.report.schemas += 1;
        tracing::info!("pass schema          | {} ({})", record.location, dialect_label(dialect));
        Ok(())
    }

    fn schema_done(&mut self) -> Result<(), GateError> {
        tracing::info!("Total schemas validated: {}", self.report.schemas);
        Ok(())
    }

    fn wants_positive(&self) -> bool {
        self.with_fixtures
    }

    fn wants_negative(&self) -> bool {
        self.with_fixtures
    }

    fn folder_schema(&mut self, schema: &SchemaRecord) -> Result<(), GateError> {
        self.current = None;
        self.validator_for(schema).map(|_| ())
    }

    fn positive(&mut self, schema: &SchemaRecord, fixture: &FixtureRecord) -> Result<(), GateError> {
        let document = fixture.parse().map_err(|e| {
            tracing::error!("Error in parse test: {e}");
            e
        })?;
        let outcome = self.validator_for(schema)?.check(&document);
        let fixture_path = fixture.path.display().to_string();
        match outcome {
            Outcome::Valid => {
                self.report.positive_passed += 1;
                tracing::info!("pass positive test   | {fixture_path}");
                Ok(())
            }
            Outcome::Invalid(violations) => {
                let (schema_path, instance_path, message) = violations
                    .first()
                    .map(|v| (v.schema_path.clone(), v.instance_path.clone(), v.message.clone()))
                    .unwrap_or_default();
                tracing::error!("failed positive test | {fixture_path}");
                tracing::error!("(Schema file) keywordLocation: {schema_path}");
                tracing::error!("(Test file) instanceLocation: {instance_path}");
                tracing::error!("(Message) {message}");
                Err(GateError::Assertion(AssertionFailure {
                    fixture: fixture_path,
                    schema: schema.location.clone(),
                    kind: AssertionKind::PositiveRejected {
                        schema_path,
                        instance_path,
                        message,
                    },
                }))
            }
        }
    }

    fn negative(&mut self, schema: &SchemaRecord, fixture: &FixtureRecord) -> Result<(), GateError> {
        let document = fixture.parse().map_err(|e| {
            tracing::error!("Error in parse test: {e}");
            e
        })?;
        let outcome = self.validator_for(schema)?.check(&document);
        let fixture_path = fixture.path.display().to_string();
        match outcome {
            Outcome::Valid => {
                tracing::error!("failed negative test | {fixture_path}");
                tracing::error!("Negative test must always fail.");
                Err(GateError::Assertion(AssertionFailure {
                    fixture: fixture_path,
                    schema: schema.location.clone(),
                    kind: AssertionKind::NegativeAccepted,
                }))
            }
            Outcome::Invalid(violations) => {
                self.report.negative_passed += 1;
                if let Some(first) = violations.first() {
                    tracing::info!(
                        "pass negative test   | {fixture_path} (Schema: {}) (Test: {}) (Message): {}",
                        first.schema_path,
                        first.instance_path,
                        first.message
                    );
                }
                self.report.last_rejection = violations.first().cloned();
                Ok(())
            }
        }
    }
}
