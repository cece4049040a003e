//! # Downgrade Prober
//!
//! Finds the oldest dialect a schema still compiles under. Starting from
//! the declared dialect, the prober walks to the next older *active*
//! catalogue entry, rewrites `$schema` on a copy of the document, and
//! asks a [`CompileOracle`] whether the copy compiles. The first failure
//! ends the walk.
//!
//! Stopping at the first failure assumes compatibility decays
//! monotonically with age. That is an approximation: a schema can fail
//! one draft and still compile under an older one. The walk reports the
//! last dialect reached before the first failure.
//!
//! draft-06 is stepped over without compiling and is never recommended.

use serde_json::Value;

use schemagate_core::{Corpus, Dialect, GateError, SchemaRecord, Storage, ValidationConfig};
use schemagate_scan::ScanVisitor;

use crate::dispatch::{build_validator, Quirks};

/// Decides whether a document compiles under a dialect.
pub trait CompileOracle {
    /// Whether `document` compiles for `dialect` with `quirks` applied.
    fn accepts(&self, dialect: Dialect, document: &Value, quirks: &Quirks) -> bool;
}

/// The strict validator dispatch as an oracle.
#[derive(Debug, Clone, Copy, Default)]
pub struct DispatchOracle;

impl CompileOracle for DispatchOracle {
    fn accepts(&self, dialect: Dialect, document: &Value, quirks: &Quirks) -> bool {
        match build_validator(Some(dialect), document, quirks) {
            Ok(_) => true,
            Err(e) => {
                tracing::debug!(%dialect, "downgrade attempt rejected: {e}");
                false
            }
        }
    }
}

/// A schema that also compiles under an older dialect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeFinding {
    /// Logical schema name.
    pub schema: String,
    /// Declared dialect.
    pub original: Dialect,
    /// Oldest dialect reached before the first failure.
    pub recommended: Dialect,
}

/// Walks older dialects with a [`CompileOracle`].
#[derive(Debug, Clone, Default)]
pub struct Prober<O = DispatchOracle> {
    oracle: O,
}

impl<O: CompileOracle> Prober<O> {
    /// Create a prober around `oracle`.
    pub fn new(oracle: O) -> Self {
        Self { oracle }
    }

    /// Probe one schema document.
    ///
    /// Returns `None` when the document has no classifiable `$schema`, or
    /// when no older dialect was reached.
    pub fn probe(&self, name: &str, document: &Value, quirks: &Quirks) -> Option<ProbeFinding> {
        let original = Dialect::classify(document)?;
        let mut recommended = original;
        let mut cursor = original;

        while let Some(candidate) = cursor.older().filter(|d| d.is_active()) {
            cursor = candidate;
            if candidate == Dialect::Draft06 {
                continue;
            }
            let attempt = retarget(document, candidate);
            if !self.oracle.accepts(candidate, &attempt, quirks) {
                break;
            }
            recommended = candidate;
        }

        (recommended != original).then(|| ProbeFinding {
            schema: name.to_string(),
            original,
            recommended,
        })
    }
}

/// A copy of `document` with `$schema` set to the canonical URI of `dialect`.
pub fn retarget(document: &Value, dialect: Dialect) -> Value {
    let mut copy = document.clone();
    if let Value::Object(map) = &mut copy {
        map.insert(
            "$schema".to_string(),
            Value::String(dialect.canonical_uri().to_string()),
        );
    }
    copy
}

/// Scan visitor probing every schema of the scan.
pub struct DowngradeScan<'a, S: Storage, O = DispatchOracle> {
    corpus: &'a Corpus<S>,
    config: &'a ValidationConfig,
    prober: Prober<O>,
    /// Findings in scan order.
    pub findings: Vec<ProbeFinding>,
    /// Schemas visited.
    pub probed: usize,
}

impl<'a, S: Storage> DowngradeScan<'a, S> {
    /// Probe with the strict validator dispatch.
    pub fn new(corpus: &'a Corpus<S>, config: &'a ValidationConfig) -> Self {
        Self::with_oracle(corpus, config, DispatchOracle)
    }
}

impl<'a, S: Storage, O: CompileOracle> DowngradeScan<'a, S, O> {
    /// Probe with a custom oracle.
    pub fn with_oracle(corpus: &'a Corpus<S>, config: &'a ValidationConfig, oracle: O) -> Self {
        Self {
            corpus,
            config,
            prober: Prober::new(oracle),
            findings: Vec::new(),
            probed: 0,
        }
    }
}

impl<S: Storage, O: CompileOracle> ScanVisitor for DowngradeScan<'_, S, O> {
    fn schema(&mut self, record: &SchemaRecord) -> Result<(), GateError> {
        self.probed += 1;
        let document = record.parse()?;
        let quirks = Quirks::resolve(&self.config.options_for(&record.file_name), self.corpus)?;
        if let Some(finding) = self.prober.probe(&record.name, &document, &quirks) {
            tracing::info!(
                "{} ({}) is also valid with ({})",
                record.location,
                finding.original,
                finding.recommended
            );
            self.findings.push(finding);
        }
        Ok(())
    }

    fn schema_done(&mut self) -> Result<(), GateError> {
        tracing::info!(
            "Downgrade candidates: {} of {} schemas",
            self.findings.len(),
            self.probed
        );
        Ok(())
    }
}
