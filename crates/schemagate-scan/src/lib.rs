//! # schemagate-scan: Corpus Scan Engine
//!
//! Walks the corpus once per task and hands every qualifying schema file
//! and fixture to a [`ScanVisitor`], in three strictly sequential stages:
//!
//! 1. **schema**: every qualifying schema file, then `schema_done`;
//! 2. **positive**: every qualifying positive fixture folder;
//! 3. **negative**: every qualifying negative fixture folder.
//!
//! A stage the visitor does not take part in is skipped entirely. The
//! layout is validated before the first callback fires, so a structural
//! defect never leaves a half-processed report behind.
//!
//! The [`checks`] module holds the file-level visitors (extension, BOM,
//! duplicate keys, `$schema` presence, catalog presence).

pub mod checks;
pub mod scanner;
pub mod visitor;

pub use checks::{
    positive_coverage, BomCheck, CatalogPresenceCheck, Coverage, DuplicateKeyCheck, ExtensionCheck,
    SchemaKeywordCheck,
};
pub use scanner::{ScanOptions, ScanSummary, Scanner};
pub use visitor::ScanVisitor;
