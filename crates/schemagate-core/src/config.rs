//! # Validation Overlay
//!
//! `schema-validation.json` carries the exemption lists and per-schema
//! quirks. Every field is optional.
//!
//! ```json
//! {
//!   "skiptest": ["broken.json"],
//!   "legacyEngine": ["loose.json"],
//!   "missingcatalogurl": ["internal.json"],
//!   "fileMatchConflict": ["app.json"],
//!   "options": [
//!     { "loose.json": { "unknownFormat": ["color"], "unknownKeywords": ["x-tags"], "externalSchema": ["base.json"] } }
//!   ]
//! }
//! ```

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::corpus::{Inclusion, ScanMode};

/// Errors loading or checking the overlay.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("cannot read {path}: {source}")]
    Read {
        /// Overlay path.
        path: String,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// The file is not a valid overlay document.
    #[error("invalid overlay {path}: {source}")]
    Invalid {
        /// Overlay path.
        path: String,
        /// Underlying parser error.
        source: serde_json::Error,
    },

    /// A list contains the same item twice.
    #[error("duplicate item '{item}' found in {list}")]
    DuplicateItem {
        /// Name of the offending list.
        list: String,
        /// The repeated item.
        item: String,
    },

    /// The same schema appears twice in `options`.
    #[error("duplicate schema name found in options: {0}")]
    DuplicateOption(String),
}

/// Per-schema quirks, as named in the overlay.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SchemaOptions {
    /// Formats accepted unconditionally.
    #[serde(default)]
    pub unknown_format: Vec<String>,
    /// Keywords the engine treats as no-ops.
    #[serde(default)]
    pub unknown_keywords: Vec<String>,
    /// Schema file names made resolvable by reference.
    #[serde(default)]
    pub external_schema: Vec<String>,
}

/// The parsed `schema-validation.json` overlay.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ValidationConfig {
    /// Schema file names never processed.
    #[serde(default)]
    pub skiptest: Vec<String>,
    /// Schema file names handled by the lenient legacy engine.
    #[serde(default, rename = "legacyEngine", alias = "tv4test")]
    pub legacy_engine: Vec<String>,
    /// Schema file names exempt from the catalog presence check.
    #[serde(default)]
    pub missingcatalogurl: Vec<String>,
    /// fileMatch patterns allowed to appear more than once.
    #[serde(default, rename = "fileMatchConflict")]
    pub file_match_conflict: Vec<String>,
    /// One single-key object per schema.
    #[serde(default)]
    pub options: Vec<BTreeMap<String, SchemaOptions>>,
}

impl ValidationConfig {
    /// Load the overlay from a file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let bytes = std::fs::read(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_slice(&bytes).map_err(|source| ConfigError::Invalid {
            path: path.display().to_string(),
            source,
        })
    }

    /// Parse the overlay from bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }

    /// Load the overlay if the file exists, otherwise use an empty one.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            tracing::debug!(path = %path.display(), "no validation overlay, using defaults");
            Ok(Self::default())
        }
    }

    /// Quirks for a schema file name; empty when not listed.
    pub fn options_for(&self, file_name: &str) -> SchemaOptions {
        self.options
            .iter()
            .find_map(|item| item.get(file_name))
            .cloned()
            .unwrap_or_default()
    }

    /// The always-skip set.
    pub fn skip_set(&self) -> BTreeSet<String> {
        self.skiptest.iter().cloned().collect()
    }

    /// The legacy engine partition.
    pub fn legacy_set(&self) -> BTreeSet<String> {
        self.legacy_engine.iter().cloned().collect()
    }

    /// Inclusion predicate for a scan in the given mode.
    pub fn inclusion(&self, mode: ScanMode) -> Inclusion {
        Inclusion {
            mode,
            skip: self.skip_set(),
            partition: self.legacy_set(),
        }
    }

    /// Reject duplicate items in every list and duplicate option entries.
    pub fn check_duplicates(&self) -> Result<(), ConfigError> {
        unique(&self.legacy_engine, "legacyEngine[]")?;
        unique(&self.skiptest, "skiptest[]")?;
        unique(&self.missingcatalogurl, "missingcatalogurl[]")?;
        unique(&self.file_match_conflict, "fileMatchConflict[]")?;

        let mut seen = HashSet::new();
        for item in &self.options {
            for (name, options) in item {
                if !seen.insert(name.as_str()) {
                    return Err(ConfigError::DuplicateOption(name.clone()));
                }
                unique(&options.unknown_keywords, &format!("{name} unknownKeywords[]"))?;
                unique(&options.unknown_format, &format!("{name} unknownFormat[]"))?;
                unique(&options.external_schema, &format!("{name} externalSchema[]"))?;
            }
        }
        Ok(())
    }
}

fn unique(list: &[String], list_name: &str) -> Result<(), ConfigError> {
    let mut seen = HashSet::new();
    for item in list {
        if !seen.insert(item) {
            return Err(ConfigError::DuplicateItem {
                list: list_name.to_string(),
                item: item.clone(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const OVERLAY: &str = r#"{
        "skiptest": ["broken.json"],
        "tv4test": ["loose.json"],
        "options": [
            { "loose.json": { "unknownFormat": ["color"], "externalSchema": ["base.json"] } },
            { "other.json": { "unknownKeywords": ["x-tags"] } }
        ]
    }"#;

    #[test]
    fn parses_overlay_with_legacy_alias() {
        let config = ValidationConfig::from_slice(OVERLAY.as_bytes()).unwrap();
        assert_eq!(config.legacy_engine, vec!["loose.json"]);
        assert!(config.missingcatalogurl.is_empty());
        let options = config.options_for("loose.json");
        assert_eq!(options.unknown_format, vec!["color"]);
        assert_eq!(options.external_schema, vec!["base.json"]);
        assert!(options.unknown_keywords.is_empty());
        assert_eq!(config.options_for("absent.json"), SchemaOptions::default());
        config.check_duplicates().unwrap();
    }

    #[test]
    fn inclusion_uses_lists() {
        let config = ValidationConfig::from_slice(OVERLAY.as_bytes()).unwrap();
        let modern = config.inclusion(ScanMode::Partitioned { member: false });
        assert!(!modern.admits("loose.json"));
        assert!(!modern.admits("broken.json"));
        assert!(modern.admits("address.json"));
        let legacy = config.inclusion(ScanMode::Partitioned { member: true });
        assert!(legacy.admits("loose.json"));
    }

    #[test]
    fn duplicate_list_item_rejected() {
        let config =
            ValidationConfig::from_slice(br#"{"skiptest": ["a.json", "a.json"]}"#).unwrap();
        let err = config.check_duplicates().unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateItem { ref item, .. } if item == "a.json"));
    }

    #[test]
    fn duplicate_option_rejected() {
        let config = ValidationConfig::from_slice(
            br#"{"options": [{"a.json": {}}, {"a.json": {"unknownFormat": ["x"]}}]}"#,
        )
        .unwrap();
        assert!(matches!(
            config.check_duplicates().unwrap_err(),
            ConfigError::DuplicateOption(_)
        ));
    }

    #[test]
    fn duplicate_inside_option_rejected() {
        let config = ValidationConfig::from_slice(
            br#"{"options": [{"a.json": {"unknownKeywords": ["k", "k"]}}]}"#,
        )
        .unwrap();
        assert!(config.check_duplicates().is_err());
    }

    #[test]
    fn unknown_option_field_rejected() {
        assert!(ValidationConfig::from_slice(br#"{"options": [{"a.json": {"bogus": []}}]}"#).is_err());
    }
}
