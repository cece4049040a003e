//! # Error Types: Local Gate Taxonomy
//!
//! Every local check is fail-fast: any [`GateError`] aborts the task that
//! raised it. Remote sourcing has its own error type in
//! `schemagate-remote` and is never fatal.
//!
//! ## Design
//!
//! - Structural corpus defects are [`StructureError`]s and are detected
//!   before any visitor runs.
//! - Assertion failures carry the full diagnostic (schema pointer,
//!   instance pointer, message) so it can be logged before aborting.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::catalog::CatalogError;
use crate::config::ConfigError;
use crate::corpus::Polarity;

/// Top-level error type for schemagate tasks.
#[derive(Error, Debug)]
pub enum GateError {
    /// Corpus layout violation.
    #[error("structure error: {0}")]
    Structure(#[from] StructureError),

    /// A file could not be read.
    #[error("io error reading {location}: {source}")]
    Io {
        /// Path of the file or directory.
        location: String,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// A file's bytes are not valid JSON.
    #[error("parse error in {location}: {source}")]
    Parse {
        /// Path or URL of the document.
        location: String,
        /// Underlying parser error.
        source: serde_json::Error,
    },

    /// A schema failed to compile for its dialect.
    #[error("compile error in {location} ({dialect}): {reason}")]
    Compile {
        /// Path or URL of the schema.
        location: String,
        /// Dialect label the schema was compiled under.
        dialect: String,
        /// Engine diagnostic, unchanged.
        reason: String,
    },

    /// A fixture did not behave as its polarity requires.
    #[error("assertion error: {0}")]
    Assertion(AssertionFailure),

    /// A schema file starts with a byte-order mark.
    #[error("schema file must not have {encoding} BOM: {location}")]
    ByteOrderMark {
        /// Path or URL of the file.
        location: String,
        /// Encoding name of the detected mark.
        encoding: &'static str,
    },

    /// An object in a fixture repeats a key.
    #[error("duplicated keys found in {location}: {}", keys.join(", "))]
    DuplicateKeys {
        /// Path of the fixture.
        location: String,
        /// `key (occurrences)` entries.
        keys: Vec<String>,
    },

    /// A corpus file name does not end with `.json`.
    #[error("file name must have .json extension: {0}")]
    MissingExtension(String),

    /// A schema file has no `$schema` keyword.
    #[error("schema file is missing '$schema' keyword: {0}")]
    MissingSchemaKeyword(String),

    /// A local schema file is not referenced by any catalog URL.
    #[error("schema file name must be present in the catalog URLs: {0}")]
    NotInCatalog(String),

    /// Invalid validation overlay.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// Catalog consistency violation.
    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),
}

impl GateError {
    /// Build an [`GateError::Io`] for `path`.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            location: path.into().display().to_string(),
            source,
        }
    }
}

/// Corpus layout violation.
#[derive(Error, Debug)]
pub enum StructureError {
    /// An entry that must be a file is something else.
    #[error("there can only be files in directory {dir}: {name}")]
    NotAFile {
        /// Directory containing the entry.
        dir: PathBuf,
        /// Entry name.
        name: String,
    },

    /// An entry that must be a directory is something else.
    #[error("there can only be directories in {dir}: {name}")]
    NotADirectory {
        /// Directory containing the entry.
        dir: PathBuf,
        /// Entry name.
        name: String,
    },

    /// A fixture folder contains no files.
    #[error("found folder with no test files: {folder} ({})", dir.display())]
    EmptyFixtureFolder {
        /// Folder name (= owning schema name).
        folder: String,
        /// Full path of the folder.
        dir: PathBuf,
    },

    /// A fixture folder has no sibling schema file.
    #[error("test folder {folder} has no schema file {}", path.display())]
    MissingSchema {
        /// Folder name.
        folder: String,
        /// Expected schema path.
        path: PathBuf,
    },

    /// A configured corpus directory does not exist or is not a directory.
    #[error("corpus directory not found: {}", .0.display())]
    MissingDirectory(PathBuf),
}

/// A fixture that violated its polarity.
#[derive(Debug, Clone)]
pub struct AssertionFailure {
    /// Fixture path.
    pub fixture: String,
    /// Schema file the fixture was checked against.
    pub schema: String,
    /// What went wrong.
    pub kind: AssertionKind,
}

/// The two ways a fixture can violate its polarity.
#[derive(Debug, Clone)]
pub enum AssertionKind {
    /// A positive fixture failed validation.
    PositiveRejected {
        /// Pointer to the failing rule in the schema.
        schema_path: String,
        /// Pointer to the failing location in the fixture.
        instance_path: String,
        /// Engine message.
        message: String,
    },
    /// A negative fixture passed validation.
    NegativeAccepted,
}

impl AssertionFailure {
    /// Polarity of the fixture that failed.
    pub fn polarity(&self) -> Polarity {
        match self.kind {
            AssertionKind::PositiveRejected { .. } => Polarity::Positive,
            AssertionKind::NegativeAccepted => Polarity::Negative,
        }
    }
}

impl fmt::Display for AssertionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            AssertionKind::PositiveRejected {
                schema_path,
                instance_path,
                message,
            } => write!(
                f,
                "positive test {} failed against {} (schema: {schema_path}) (test: {instance_path}) {message}",
                self.fixture, self.schema
            ),
            AssertionKind::NegativeAccepted => write!(
                f,
                "negative test {} must always fail against {}",
                self.fixture, self.schema
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positive_failure_display_carries_full_diagnostic() {
        let failure = AssertionFailure {
            fixture: "test/address/a.json".into(),
            schema: "schemas/json/address.json".into(),
            kind: AssertionKind::PositiveRejected {
                schema_path: "/required".into(),
                instance_path: "".into(),
                message: "\"street\" is a required property".into(),
            },
        };
        let text = failure.to_string();
        assert!(text.contains("/required"));
        assert!(text.contains("street"));
        assert_eq!(failure.polarity(), Polarity::Positive);
    }

    #[test]
    fn negative_failure_polarity() {
        let failure = AssertionFailure {
            fixture: "negative_test/address/b.json".into(),
            schema: "schemas/json/address.json".into(),
            kind: AssertionKind::NegativeAccepted,
        };
        assert_eq!(failure.polarity(), Polarity::Negative);
        assert!(GateError::Assertion(failure).to_string().contains("must always fail"));
    }

    #[test]
    fn empty_folder_names_the_folder() {
        let err = StructureError::EmptyFixtureFolder {
            folder: "address".into(),
            dir: PathBuf::from("test/address"),
        };
        assert!(err.to_string().contains("address"));
    }
}
