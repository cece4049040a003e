//! # Validator Dispatch
//!
//! Maps a classified [`Dialect`] to one of four engine families and
//! compiles a schema under that family with the schema's quirks applied.
//!
//! | Dialect                               | Family        |
//! |---------------------------------------|---------------|
//! | draft-04, draft-03, unversioned, none | draft-04      |
//! | draft-06, draft-07                    | draft-06/07   |
//! | 2019-09                               | 2019-09       |
//! | 2020-12                               | 2020-12       |
//!
//! Strict mode runs the keyword vocabulary pass before the engine sees
//! the schema. Lenient mode (the legacy engine) skips it.
//!
//! ## Reference Resolution
//!
//! External schemas named in the quirks are indexed by their `$id` (or
//! draft-04 `id`) and by file name. Any other non-metaschema reference
//! fails compilation instead of going to the network.

use std::collections::{BTreeSet, HashMap};
use std::fmt;

use jsonschema::{Draft, Retrieve, Uri, Validator};
use serde_json::Value;
use thiserror::Error;

use schemagate_core::{Corpus, Dialect, GateError, SchemaOptions, Storage};

use crate::vocabulary::Vocabulary;

/// Host of the official metaschemas.
const METASCHEMA_HOST: &str = "json-schema.org";

/// A group of dialects sharing one rule set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EngineFamily {
    /// draft-04, also serving draft-03, unversioned and unknown schemas.
    Draft04,
    /// draft-06 and draft-07.
    Draft06And07,
    /// 2019-09.
    Draft201909,
    /// 2020-12.
    Draft202012,
}

impl EngineFamily {
    /// The family serving `dialect`. Schemas with no recognised dialect
    /// fall back to draft-04.
    pub fn for_dialect(dialect: Option<Dialect>) -> Self {
        match dialect {
            Some(Dialect::Draft2020_12) => Self::Draft202012,
            Some(Dialect::Draft2019_09) => Self::Draft201909,
            Some(Dialect::Draft07 | Dialect::Draft06) => Self::Draft06And07,
            Some(Dialect::Draft04 | Dialect::Draft03 | Dialect::Unversioned) | None => Self::Draft04,
        }
    }

    fn engine_draft(self, dialect: Option<Dialect>) -> Draft {
        match self {
            Self::Draft04 => Draft::Draft4,
            Self::Draft06And07 if dialect == Some(Dialect::Draft06) => Draft::Draft6,
            Self::Draft06And07 => Draft::Draft7,
            Self::Draft201909 => Draft::Draft201909,
            Self::Draft202012 => Draft::Draft202012,
        }
    }
}

impl fmt::Display for EngineFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Draft04 => "draft-04",
            Self::Draft06And07 => "draft-06/07",
            Self::Draft201909 => "2019-09",
            Self::Draft202012 => "2020-12",
        })
    }
}

/// Whether the vocabulary pass runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strictness {
    /// Unknown keywords and formats are compile errors.
    Strict,
    /// Unknown keywords and formats are ignored.
    Lenient,
}

/// A schema made resolvable by reference.
#[derive(Debug, Clone)]
pub struct ExternalSchema {
    /// File name inside the schema directory.
    pub file_name: String,
    /// Parsed document.
    pub document: Value,
}

/// Per-schema adjustments applied at compile time.
#[derive(Debug, Clone, Default)]
pub struct Quirks {
    /// Keywords treated as no-ops.
    pub ignored_keywords: BTreeSet<String>,
    /// Formats accepted for any string.
    pub permitted_formats: BTreeSet<String>,
    /// Schemas registered for reference resolution.
    pub external_schemas: Vec<ExternalSchema>,
}

impl Quirks {
    /// Resolve overlay options against the corpus, reading and parsing
    /// every external schema they name.
    pub fn resolve<S: Storage>(options: &SchemaOptions, corpus: &Corpus<S>) -> Result<Self, GateError> {
        let mut external_schemas = Vec::with_capacity(options.external_schema.len());
        for file_name in &options.external_schema {
            let record = corpus.read_schema(file_name)?;
            external_schemas.push(ExternalSchema {
                file_name: file_name.clone(),
                document: record.parse()?,
            });
        }
        Ok(Self {
            ignored_keywords: options.unknown_keywords.iter().cloned().collect(),
            permitted_formats: options.unknown_format.iter().cloned().collect(),
            external_schemas,
        })
    }
}

/// Errors compiling a schema.
#[derive(Error, Debug)]
pub enum CompileError {
    /// Strict mode met a keyword the family does not define.
    #[error("strict mode: unknown keyword: \"{keyword}\" at {pointer} ({family})")]
    UnknownKeyword {
        /// The keyword.
        keyword: String,
        /// JSON pointer of the subschema holding it.
        pointer: String,
        /// Family the schema was compiled for.
        family: EngineFamily,
    },

    /// Strict mode met a format the dialect does not know.
    #[error("unknown format \"{format}\" at {pointer} ({family})")]
    UnknownFormat {
        /// The format name.
        format: String,
        /// JSON pointer of the subschema holding it.
        pointer: String,
        /// Family the schema was compiled for.
        family: EngineFamily,
    },

    /// The engine rejected the schema.
    #[error("{0}")]
    Engine(String),
}

/// A single violation reported by a compiled validator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Violation {
    /// JSON pointer into the fixture.
    pub instance_path: String,
    /// JSON pointer into the schema (the keyword location).
    pub schema_path: String,
    /// Human-readable message.
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.instance_path.is_empty() {
            write!(f, "(root): {}", self.message)
        } else {
            write!(f, "{}: {}", self.instance_path, self.message)
        }
    }
}

/// Non-empty list of violations, in engine order.
#[derive(Debug, Clone)]
pub struct Violations(Vec<Violation>);

impl Violations {
    /// The first reported violation.
    pub fn first(&self) -> Option<&Violation> {
        self.0.first()
    }

    /// Number of violations.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false for violations produced by a validator.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// All violations.
    pub fn iter(&self) -> impl Iterator<Item = &Violation> {
        self.0.iter()
    }
}

/// Result of validating one instance.
#[derive(Debug, Clone)]
pub enum Outcome {
    /// The instance satisfies the schema.
    Valid,
    /// The instance violates the schema.
    Invalid(Violations),
}

impl Outcome {
    /// Whether the instance satisfied the schema.
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }
}

/// A schema compiled for one engine family.
pub struct CompiledValidator {
    inner: Validator,
    family: EngineFamily,
}

impl fmt::Debug for CompiledValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledValidator")
            .field("family", &self.family)
            .finish_non_exhaustive()
    }
}

impl CompiledValidator {
    /// Family the schema was compiled for.
    pub fn family(&self) -> EngineFamily {
        self.family
    }

    /// Validate `instance`, collecting every violation.
    pub fn check(&self, instance: &Value) -> Outcome {
        let violations: Vec<Violation> = self
            .inner
            .iter_errors(instance)
            .map(|e| Violation {
                instance_path: e.instance_path.to_string(),
                schema_path: e.schema_path.to_string(),
                message: e.to_string(),
            })
            .collect();
        if violations.is_empty() {
            Outcome::Valid
        } else {
            Outcome::Invalid(Violations(violations))
        }
    }
}

/// Compile `schema` in strict mode for `dialect`.
pub fn build_validator(
    dialect: Option<Dialect>,
    schema: &Value,
    quirks: &Quirks,
) -> Result<CompiledValidator, CompileError> {
    build_with(dialect, schema, quirks, Strictness::Strict)
}

/// Compile `schema` with the lenient draft-04 legacy engine.
pub fn build_legacy_validator(schema: &Value, quirks: &Quirks) -> Result<CompiledValidator, CompileError> {
    build_with(Some(Dialect::Draft04), schema, quirks, Strictness::Lenient)
}

/// Compile `schema` for `dialect` with explicit strictness.
pub fn build_with(
    dialect: Option<Dialect>,
    schema: &Value,
    quirks: &Quirks,
    strictness: Strictness,
) -> Result<CompiledValidator, CompileError> {
    let family = EngineFamily::for_dialect(dialect);
    if strictness == Strictness::Strict {
        Vocabulary::for_dialect(dialect).check(schema, quirks)?;
    }

    // Formats the engine does not implement, permitted ones included, always pass.
    let inner = jsonschema::options()
        .with_draft(family.engine_draft(dialect))
        .should_validate_formats(true)
        .should_ignore_unknown_formats(true)
        .with_retriever(LocalSchemaRetriever::new(&quirks.external_schemas))
        .build(schema)
        .map_err(|e| CompileError::Engine(e.to_string()))?;
    tracing::trace!(%family, ?strictness, "compiled schema");
    Ok(CompiledValidator { inner, family })
}

/// Resolves references to the external schemas of one compilation.
///
/// Lookups try the full URI, then its last path segment as a file name.
/// Official metaschema URIs resolve to a permissive schema; anything else
/// is an error, so a missing external schema surfaces as a compile error.
struct LocalSchemaRetriever {
    schemas_by_uri: HashMap<String, Value>,
}

impl LocalSchemaRetriever {
    fn new(externals: &[ExternalSchema]) -> Self {
        let mut schemas_by_uri = HashMap::new();
        for external in externals {
            let document = &external.document;
            for key in ["$id", "id"] {
                if let Some(id) = document.get(key).and_then(Value::as_str) {
                    schemas_by_uri.insert(strip_fragment(id).to_string(), document.clone());
                }
            }
            schemas_by_uri.insert(external.file_name.clone(), document.clone());
        }
        Self { schemas_by_uri }
    }
}

impl Retrieve for LocalSchemaRetriever {
    fn retrieve(
        &self,
        uri: &Uri<&str>,
    ) -> Result<Value, Box<dyn std::error::Error + Send + Sync>> {
        let uri_str = strip_fragment(uri.as_str());

        if let Some(value) = self.schemas_by_uri.get(uri_str) {
            return Ok(value.clone());
        }

        let filename = uri_str.rsplit('/').next().unwrap_or(uri_str);
        if let Some(value) = self.schemas_by_uri.get(filename) {
            return Ok(value.clone());
        }

        if uri_str.contains(METASCHEMA_HOST) {
            return Ok(serde_json::json!({}));
        }

        Err(format!("unresolved reference: {uri_str}").into())
    }
}

fn strip_fragment(uri: &str) -> &str {
    uri.split_once('#').map_or(uri, |(base, _)| base)
}
