//! # schemagate-core: Corpus Model & Dialect Catalogue
//!
//! Foundational types shared by every schemagate crate.
//!
//! ## Modules
//!
//! - [`corpus`]: read-only view of the on-disk corpus: schema files,
//!   positive fixture folders, negative fixture folders, and the inclusion
//!   predicate that gates every file before it reaches a visitor.
//! - [`dialect`]: the ordered catalogue of JSON Schema dialects and the
//!   `$schema` classifier.
//! - [`config`]: the per-schema option overlay and exemption lists read
//!   from `schema-validation.json`.
//! - [`catalog`]: the schema catalog (`catalog.json`) model and its
//!   URL/fileMatch consistency checks.
//! - [`hygiene`]: byte-level checks: byte-order marks and duplicate
//!   object keys.
//! - [`error`]: the error taxonomy used across the workspace.
//!
//! ## Crate Policy
//!
//! - No network access and no JSON Schema evaluation here.
//! - Local corpus checks are strict: every structural defect is an error.

pub mod catalog;
pub mod config;
pub mod corpus;
pub mod dialect;
pub mod error;
pub mod hygiene;

pub use catalog::{Catalog, CatalogEntry, CatalogError};
pub use config::{ConfigError, SchemaOptions, ValidationConfig};
pub use corpus::{
    Corpus, CorpusLayout, EntryKind, FixtureRecord, FsStorage, Inclusion, Polarity, ScanMode,
    SchemaRecord, Storage,
};
pub use dialect::Dialect;
pub use error::{AssertionFailure, AssertionKind, GateError, StructureError};
pub use hygiene::{detect_bom, find_duplicate_keys, ByteOrderMark, DuplicateKey};
