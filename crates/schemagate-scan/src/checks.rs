//! # File-Level Checks
//!
//! Visitors that need nothing beyond raw bytes or a parsed value. Each
//! counts what it scanned so the caller can print a total.

use std::collections::BTreeSet;

use schemagate_core::{
    detect_bom, find_duplicate_keys, Corpus, FixtureRecord, GateError, Polarity, SchemaRecord,
    Storage,
};

use crate::visitor::ScanVisitor;

/// Every schema and fixture file name ends with `.json`.
#[derive(Debug, Default)]
pub struct ExtensionCheck {
    /// Files checked.
    pub scanned: usize,
}

impl ExtensionCheck {
    fn check(&mut self, file_name: &str, location: &str) -> Result<(), GateError> {
        self.scanned += 1;
        if file_name.ends_with(".json") {
            Ok(())
        } else {
            Err(GateError::MissingExtension(location.to_string()))
        }
    }
}

impl ScanVisitor for ExtensionCheck {
    fn schema(&mut self, record: &SchemaRecord) -> Result<(), GateError> {
        self.check(&record.file_name, &record.location)
    }

    fn wants_positive(&self) -> bool {
        true
    }

    fn wants_negative(&self) -> bool {
        true
    }

    fn positive(&mut self, _: &SchemaRecord, fixture: &FixtureRecord) -> Result<(), GateError> {
        self.check(&fixture.file_name, &fixture.path.display().to_string())
    }

    fn negative(&mut self, _: &SchemaRecord, fixture: &FixtureRecord) -> Result<(), GateError> {
        self.check(&fixture.file_name, &fixture.path.display().to_string())
    }
}

/// Schema files must not start with a byte-order mark.
#[derive(Debug, Default)]
pub struct BomCheck {
    /// Files checked.
    pub scanned: usize,
}

impl ScanVisitor for BomCheck {
    fn schema(&mut self, record: &SchemaRecord) -> Result<(), GateError> {
        self.scanned += 1;
        match detect_bom(&record.raw) {
            Some(mark) => Err(GateError::ByteOrderMark {
                location: record.location.clone(),
                encoding: mark.encoding,
            }),
            None => Ok(()),
        }
    }
}

/// Positive fixtures must not repeat a key inside one object.
#[derive(Debug, Default)]
pub struct DuplicateKeyCheck {
    /// Fixtures checked.
    pub scanned: usize,
}

impl ScanVisitor for DuplicateKeyCheck {
    fn wants_positive(&self) -> bool {
        true
    }

    fn positive(&mut self, _: &SchemaRecord, fixture: &FixtureRecord) -> Result<(), GateError> {
        self.scanned += 1;
        let location = fixture.path.display().to_string();
        let duplicates = find_duplicate_keys(&fixture.raw).map_err(|source| GateError::Parse {
            location: location.clone(),
            source,
        })?;
        if duplicates.is_empty() {
            return Ok(());
        }
        tracing::error!("Duplicated key found in: {location}");
        for duplicate in &duplicates {
            tracing::error!("{duplicate} <= This duplicate key is found.");
        }
        Err(GateError::DuplicateKeys {
            location,
            keys: duplicates.iter().map(ToString::to_string).collect(),
        })
    }
}

/// Every schema file parses and declares `$schema`.
#[derive(Debug, Default)]
pub struct SchemaKeywordCheck {
    /// Files checked.
    pub scanned: usize,
}

impl ScanVisitor for SchemaKeywordCheck {
    fn schema(&mut self, record: &SchemaRecord) -> Result<(), GateError> {
        self.scanned += 1;
        let document = record.parse()?;
        if document.get("$schema").is_some() {
            Ok(())
        } else {
            Err(GateError::MissingSchemaKeyword(record.file_name.clone()))
        }
    }
}

/// Every schema file is referenced by a local catalog URL.
#[derive(Debug)]
pub struct CatalogPresenceCheck {
    catalog_files: BTreeSet<String>,
    exempt: BTreeSet<String>,
    /// Files checked (exempt files are not counted).
    pub scanned: usize,
}

impl CatalogPresenceCheck {
    /// Check against the catalog's local file names, skipping `exempt`.
    pub fn new(catalog_files: BTreeSet<String>, exempt: impl IntoIterator<Item = String>) -> Self {
        Self {
            catalog_files,
            exempt: exempt.into_iter().collect(),
            scanned: 0,
        }
    }
}

impl ScanVisitor for CatalogPresenceCheck {
    fn schema(&mut self, record: &SchemaRecord) -> Result<(), GateError> {
        if self.exempt.contains(&record.file_name) {
            return Ok(());
        }
        self.scanned += 1;
        if self.catalog_files.contains(&record.file_name) {
            Ok(())
        } else {
            Err(GateError::NotInCatalog(record.file_name.clone()))
        }
    }
}

/// Schemas lacking a positive fixture folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Coverage {
    /// Schema files considered.
    pub total: usize,
    /// Schema file names without a folder.
    pub missing: Vec<String>,
}

impl Coverage {
    /// Share of schemas without positive fixtures, in percent.
    pub fn missing_percent(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.missing.len() as f64 * 100.0 / self.total as f64
        }
    }
}

/// Compare schema files against positive fixture folders.
pub fn positive_coverage<S: Storage>(corpus: &Corpus<S>) -> Result<Coverage, GateError> {
    let schemas = corpus.list_schema_files()?;
    let folders: BTreeSet<String> = corpus
        .list_fixture_folders(Polarity::Positive)?
        .into_iter()
        .collect();
    let missing = schemas
        .iter()
        .filter(|file| {
            let name = file.strip_suffix(".json").unwrap_or(file.as_str());
            !folders.contains(name)
        })
        .cloned()
        .collect();
    Ok(Coverage {
        total: schemas.len(),
        missing,
    })
}
