//! # Schema Catalog
//!
//! The catalog (`api/json/catalog.json`) lists every published schema with
//! its URL, optional versioned URLs and the file patterns it applies to.
//! URLs under [`LOCAL_URL_PREFIX`] are served from the local schema
//! directory; all others are external and only reachable remotely.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::path::Path;

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

/// Prefix of URLs served from the local schema directory.
pub const LOCAL_URL_PREFIX: &str = "https://json.schemastore.org";

/// Host marker identifying a URL that claims to be local.
const LOCAL_HOST_MARKER: &str = "schemastore.org";

/// Path segment (after splitting on `/`) that must hold the file name.
const FILE_NAME_SEGMENT: usize = 3;

/// Catalog consistency violation.
#[derive(Error, Debug)]
pub enum CatalogError {
    /// The catalog file could not be read.
    #[error("cannot read catalog {path}: {source}")]
    Read {
        /// Catalog path.
        path: String,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// The catalog is not valid JSON or has the wrong shape.
    #[error("invalid catalog {path}: {source}")]
    Invalid {
        /// Catalog path.
        path: String,
        /// Underlying parser error.
        source: serde_json::Error,
    },

    /// A local URL does not use the canonical prefix.
    #[error("wrong: {url} must be in this format: {LOCAL_URL_PREFIX}/<schemaName>.json")]
    WrongUrlFormat {
        /// Offending URL.
        url: String,
    },

    /// A local URL does not end in a `.json` file name.
    #[error("wrong: {url} missing \".json\" extension")]
    MissingExtension {
        /// Offending URL.
        url: String,
    },

    /// A local URL points at a schema file that does not exist.
    #[error("schema file not found: {file} (catalog URL: {url})")]
    SchemaFileNotFound {
        /// Expected file name.
        file: String,
        /// Catalog URL.
        url: String,
    },

    /// A fileMatch pattern is claimed by two catalog entries.
    #[error("duplicate fileMatch found: {0}")]
    DuplicateFileMatch(String),
}

/// One catalog entry.
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogEntry {
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Canonical URL.
    pub url: String,
    /// File patterns the schema applies to.
    #[serde(default, rename = "fileMatch")]
    pub file_match: Vec<String>,
    /// Versioned URLs keyed by version label.
    #[serde(default)]
    pub versions: BTreeMap<String, String>,
}

/// The parsed catalog.
#[derive(Debug, Clone, Deserialize)]
pub struct Catalog {
    /// All entries, in file order.
    pub schemas: Vec<CatalogEntry>,
}

impl Catalog {
    /// Load the catalog, returning both the typed view and the raw
    /// document (for schema validation).
    pub fn load(path: &Path) -> Result<(Self, Value), CatalogError> {
        let bytes = std::fs::read(path).map_err(|source| CatalogError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let invalid = |source: serde_json::Error| CatalogError::Invalid {
            path: path.display().to_string(),
            source,
        };
        let raw: Value = serde_json::from_slice(&bytes).map_err(invalid)?;
        let catalog = Self::from_value(raw.clone()).map_err(invalid)?;
        Ok((catalog, raw))
    }

    /// Build the typed view from a parsed document.
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }

    /// Every URL in the catalog: each entry's URL followed by its versions.
    pub fn urls(&self) -> impl Iterator<Item = &str> {
        self.schemas.iter().flat_map(|entry| {
            std::iter::once(entry.url.as_str()).chain(entry.versions.values().map(String::as_str))
        })
    }

    /// Canonical URLs of entries hosted outside the local schema directory.
    pub fn remote_urls(&self) -> Vec<&str> {
        self.schemas
            .iter()
            .map(|entry| entry.url.as_str())
            .filter(|url| !url.starts_with(LOCAL_URL_PREFIX))
            .collect()
    }

    /// File names referenced by local URLs.
    pub fn local_file_names(&self) -> BTreeSet<String> {
        self.urls()
            .filter(|url| url.starts_with(LOCAL_URL_PREFIX))
            .filter_map(|url| url.rsplit('/').next())
            .map(str::to_string)
            .collect()
    }

    /// Check every local URL: canonical prefix, `.json` file name at the
    /// expected depth, and an existing schema file. Returns the number of
    /// URLs checked.
    pub fn check_local_urls(
        &self,
        schema_exists: impl Fn(&str) -> bool,
    ) -> Result<usize, CatalogError> {
        let mut count = 0;
        for url in self.urls() {
            if !url.contains(LOCAL_HOST_MARKER) {
                continue;
            }
            count += 1;
            if !url.starts_with(LOCAL_URL_PREFIX) {
                return Err(CatalogError::WrongUrlFormat { url: url.to_string() });
            }
            let file = url.split('/').nth(FILE_NAME_SEGMENT).unwrap_or_default();
            if !file.ends_with(".json") {
                return Err(CatalogError::MissingExtension { url: url.to_string() });
            }
            if !schema_exists(file) {
                return Err(CatalogError::SchemaFileNotFound {
                    file: file.to_string(),
                    url: url.to_string(),
                });
            }
        }
        Ok(count)
    }

    /// Reject fileMatch patterns claimed twice, ignoring the allowed list.
    ///
    /// Only exact duplicates are detected; `app.json` vs `*app.json` is not.
    pub fn check_file_match_conflicts(&self, allowed: &[String]) -> Result<(), CatalogError> {
        let mut seen = HashSet::new();
        for entry in &self.schemas {
            for pattern in &entry.file_match {
                if allowed.contains(pattern) {
                    continue;
                }
                if !seen.insert(pattern.as_str()) {
                    return Err(CatalogError::DuplicateFileMatch(pattern.clone()));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn catalog() -> Catalog {
        Catalog::from_value(json!({
            "$schema": "https://json.schemastore.org/schema-catalog.json",
            "version": 1,
            "schemas": [
                {
                    "name": "Address",
                    "url": "https://json.schemastore.org/address.json",
                    "fileMatch": ["address.json"],
                    "versions": { "1.0": "https://json.schemastore.org/address-1.0.json" }
                },
                {
                    "name": "External",
                    "url": "https://example.com/ext.json",
                    "fileMatch": ["ext.json"]
                }
            ]
        }))
        .unwrap()
    }

    #[test]
    fn urls_include_versions() {
        let catalog = catalog();
        let urls: Vec<_> = catalog.urls().collect();
        assert_eq!(urls.len(), 3);
        assert!(urls.contains(&"https://json.schemastore.org/address-1.0.json"));
    }

    #[test]
    fn remote_urls_exclude_local() {
        assert_eq!(catalog().remote_urls(), vec!["https://example.com/ext.json"]);
    }

    #[test]
    fn local_file_names() {
        let names = catalog().local_file_names();
        assert!(names.contains("address.json"));
        assert!(names.contains("address-1.0.json"));
        assert!(!names.contains("ext.json"));
    }

    #[test]
    fn local_urls_checked_against_files() {
        let c = catalog();
        assert_eq!(c.check_local_urls(|_| true).unwrap(), 2);
        let err = c.check_local_urls(|f| f == "address.json").unwrap_err();
        assert!(matches!(err, CatalogError::SchemaFileNotFound { ref file, .. } if file == "address-1.0.json"));
    }

    #[test]
    fn non_canonical_local_url_rejected() {
        let c = Catalog::from_value(json!({
            "schemas": [{ "url": "https://www.schemastore.org/json/a.json" }]
        }))
        .unwrap();
        assert!(matches!(
            c.check_local_urls(|_| true).unwrap_err(),
            CatalogError::WrongUrlFormat { .. }
        ));
    }

    #[test]
    fn local_url_without_extension_rejected() {
        let c = Catalog::from_value(json!({
            "schemas": [{ "url": "https://json.schemastore.org/a" }]
        }))
        .unwrap();
        assert!(matches!(
            c.check_local_urls(|_| true).unwrap_err(),
            CatalogError::MissingExtension { .. }
        ));
    }

    #[test]
    fn file_match_conflicts() {
        let c = Catalog::from_value(json!({
            "schemas": [
                { "url": "https://json.schemastore.org/a.json", "fileMatch": ["app.json"] },
                { "url": "https://json.schemastore.org/b.json", "fileMatch": ["app.json"] }
            ]
        }))
        .unwrap();
        assert!(matches!(
            c.check_file_match_conflicts(&[]).unwrap_err(),
            CatalogError::DuplicateFileMatch(ref p) if p == "app.json"
        ));
        c.check_file_match_conflicts(&["app.json".to_string()]).unwrap();
    }
}
