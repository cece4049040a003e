//! The corpus, overlay and catalog of one store checkout.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde_json::Value;

use schemagate_core::{Catalog, Corpus, ValidationConfig};

/// Overlay file, relative to the root.
pub const CONFIG_FILE: &str = "schema-validation.json";
/// Catalog file, relative to the root.
pub const CATALOG_FILE: &str = "api/json/catalog.json";
/// Schema the catalog must satisfy, inside the schema directory.
pub const CATALOG_SCHEMA: &str = "schema-catalog.json";

/// Everything a task needs.
pub struct Workspace {
    /// Store root.
    pub root: PathBuf,
    /// The corpus under the root.
    pub corpus: Corpus,
    /// The validation overlay, or an empty one.
    pub config: ValidationConfig,
}

impl Workspace {
    /// Open the store at `root`, loading the overlay if present.
    pub fn open(root: &Path) -> Result<Self> {
        let config = ValidationConfig::load_or_default(&root.join(CONFIG_FILE))
            .context("failed to load validation overlay")?;
        Ok(Self {
            root: root.to_path_buf(),
            corpus: Corpus::open(root),
            config,
        })
    }

    /// Load the catalog and its raw document.
    pub fn catalog(&self) -> Result<(Catalog, Value)> {
        Catalog::load(&self.root.join(CATALOG_FILE)).context("failed to load catalog")
    }
}
