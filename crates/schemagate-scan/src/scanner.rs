//! # Scanner
//!
//! Drives a [`ScanVisitor`] over a [`Corpus`]. Single-threaded and
//! synchronous: folders are processed one at a time to completion, in
//! name order.
//!
//! ## Failure semantics
//!
//! - The plan (schema files, qualifying folders, their fixture lists and
//!   sibling schema files) is built and validated before any callback.
//!   An empty qualifying folder is a fatal [`StructureError`].
//! - Read and parse failures of individual files reach the visitor, which
//!   decides what is fatal. Any error returned by a callback aborts the
//!   scan; no partial summary is returned.

use schemagate_core::{
    Corpus, EntryKind, GateError, Inclusion, Polarity, ScanMode, Storage,
    StructureError, ValidationConfig,
};

use crate::visitor::ScanVisitor;

/// Scan configuration.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Gate applied to every schema file and fixture folder.
    pub inclusion: Inclusion,
    /// False for engines without a negative-test concept; the negative
    /// stage is then skipped regardless of the visitor.
    pub negative_supported: bool,
    /// Log every fixture folder as it is entered.
    pub log_folders: bool,
}

impl ScanOptions {
    /// Every file, no exemptions.
    pub fn full() -> Self {
        Self {
            inclusion: Inclusion::full(),
            negative_supported: true,
            log_folders: false,
        }
    }

    /// Every file except the overlay's skip list.
    pub fn full_with(config: &ValidationConfig) -> Self {
        Self {
            inclusion: config.inclusion(ScanMode::Full),
            negative_supported: true,
            log_folders: false,
        }
    }

    /// The strict engine's share of the corpus: everything outside the
    /// legacy partition, with negative fixtures.
    pub fn strict_partition(config: &ValidationConfig) -> Self {
        Self {
            inclusion: config.inclusion(ScanMode::Partitioned { member: false }),
            negative_supported: true,
            log_folders: true,
        }
    }

    /// The legacy engine's share of the corpus: the partition members,
    /// positive fixtures only.
    pub fn legacy_partition(config: &ValidationConfig) -> Self {
        Self {
            inclusion: config.inclusion(ScanMode::Partitioned { member: true }),
            negative_supported: false,
            log_folders: false,
        }
    }

    /// Enable or disable per-folder logging.
    pub fn with_folder_log(mut self, log_folders: bool) -> Self {
        self.log_folders = log_folders;
        self
    }
}

/// Counts of what a completed scan visited.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanSummary {
    /// Schema files passed to the schema stage.
    pub schemas: usize,
    /// Positive folders visited.
    pub positive_folders: usize,
    /// Positive fixtures visited.
    pub positive_fixtures: usize,
    /// Negative folders visited.
    pub negative_folders: usize,
    /// Negative fixtures visited.
    pub negative_fixtures: usize,
}

/// Validated work list for one scan.
struct Plan {
    schemas: Vec<String>,
    positive: Vec<String>,
    negative: Vec<String>,
}

/// Runs visitors over one corpus.
pub struct Scanner<'c, S: Storage> {
    corpus: &'c Corpus<S>,
    options: ScanOptions,
}

impl<'c, S: Storage> Scanner<'c, S> {
    /// Create a scanner.
    pub fn new(corpus: &'c Corpus<S>, options: ScanOptions) -> Self {
        Self { corpus, options }
    }

    /// Run all three stages for `visitor`.
    pub fn run(&self, visitor: &mut dyn ScanVisitor) -> Result<ScanSummary, GateError> {
        let plan = self.plan(visitor)?;
        let mut summary = ScanSummary::default();

        tracing::debug!(schemas = plan.schemas.len(), "schema stage");
        for file_name in &plan.schemas {
            let record = self.corpus.read_schema(file_name)?;
            visitor.schema(&record)?;
            summary.schemas += 1;
        }
        visitor.schema_done()?;

        if !plan.positive.is_empty() {
            tracing::debug!(folders = plan.positive.len(), "positive fixture stage");
            if self.options.log_folders {
                tracing::info!("-------- Processing all the positive test folders");
            }
        }
        for folder in &plan.positive {
            summary.positive_fixtures += self.run_folder(Polarity::Positive, folder, visitor)?;
            summary.positive_folders += 1;
        }

        if !plan.negative.is_empty() {
            tracing::debug!(folders = plan.negative.len(), "negative fixture stage");
            if self.options.log_folders {
                tracing::info!("-------- Processing all the negative test folders");
            }
        }
        for folder in &plan.negative {
            summary.negative_fixtures += self.run_folder(Polarity::Negative, folder, visitor)?;
            summary.negative_folders += 1;
        }

        Ok(summary)
    }

    fn plan(&self, visitor: &dyn ScanVisitor) -> Result<Plan, GateError> {
        let inclusion = &self.options.inclusion;
        let schemas = self
            .corpus
            .list_schema_files()?
            .into_iter()
            .filter(|name| inclusion.admits(name))
            .collect();

        let positive = if visitor.wants_positive() {
            self.plan_folders(Polarity::Positive)?
        } else {
            Vec::new()
        };
        let negative = if visitor.wants_negative() && self.options.negative_supported {
            self.plan_folders(Polarity::Negative)?
        } else {
            Vec::new()
        };

        Ok(Plan {
            schemas,
            positive,
            negative,
        })
    }

    fn plan_folders(&self, polarity: Polarity) -> Result<Vec<String>, GateError> {
        let mut folders = Vec::new();
        for folder in self.corpus.list_fixture_folders(polarity)? {
            if !self.options.inclusion.admits_folder(&folder) {
                continue;
            }
            self.corpus.list_fixture_files(polarity, &folder)?;
            let schema_path = self.corpus.schema_path(&folder);
            if self.corpus.storage().kind(&schema_path) != Some(EntryKind::File) {
                return Err(StructureError::MissingSchema {
                    folder,
                    path: schema_path,
                }
                .into());
            }
            folders.push(folder);
        }
        Ok(folders)
    }

    fn run_folder(
        &self,
        polarity: Polarity,
        folder: &str,
        visitor: &mut dyn ScanVisitor,
    ) -> Result<usize, GateError> {
        if self.options.log_folders {
            tracing::info!("test folder   : {folder}");
        }
        let fixtures = self.corpus.read_fixtures(polarity, folder)?;
        let schema = self.corpus.read_folder_schema(folder)?;
        visitor.folder_schema(&schema)?;
        for fixture in &fixtures {
            match polarity {
                Polarity::Positive => visitor.positive(&schema, fixture)?,
                Polarity::Negative => visitor.negative(&schema, fixture)?,
            }
        }
        match polarity {
            Polarity::Positive => visitor.positive_done(&schema)?,
            Polarity::Negative => visitor.negative_done(&schema)?,
        }
        Ok(fixtures.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use schemagate_core::{FixtureRecord, SchemaRecord};
    use std::fs;
    use std::path::Path;

    /// Records every callback as a string.
    #[derive(Default)]
    struct Recorder {
        events: Vec<String>,
        positive: bool,
        negative: bool,
    }

    impl ScanVisitor for Recorder {
        fn schema(&mut self, record: &SchemaRecord) -> Result<(), GateError> {
            self.events.push(format!("schema {}", record.file_name));
            Ok(())
        }
        fn schema_done(&mut self) -> Result<(), GateError> {
            self.events.push("schema_done".into());
            Ok(())
        }
        fn wants_positive(&self) -> bool {
            self.positive
        }
        fn wants_negative(&self) -> bool {
            self.negative
        }
        fn folder_schema(&mut self, schema: &SchemaRecord) -> Result<(), GateError> {
            self.events.push(format!("folder {}", schema.name));
            Ok(())
        }
        fn positive(&mut self, schema: &SchemaRecord, fixture: &FixtureRecord) -> Result<(), GateError> {
            self.events.push(format!("+ {}/{}", schema.name, fixture.file_name));
            Ok(())
        }
        fn positive_done(&mut self, schema: &SchemaRecord) -> Result<(), GateError> {
            self.events.push(format!("+done {}", schema.name));
            Ok(())
        }
        fn negative(&mut self, schema: &SchemaRecord, fixture: &FixtureRecord) -> Result<(), GateError> {
            self.events.push(format!("- {}/{}", schema.name, fixture.file_name));
            Ok(())
        }
        fn negative_done(&mut self, schema: &SchemaRecord) -> Result<(), GateError> {
            self.events.push(format!("-done {}", schema.name));
            Ok(())
        }
    }

    fn write(root: &Path, rel: &str, body: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, body).unwrap();
    }

    fn corpus_dir() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(root, "schemas/json/a.json", "{}");
        write(root, "schemas/json/b.json", "{}");
        write(root, "test/a/1.json", "{}");
        write(root, "test/b/1.json", "{}");
        write(root, "test/b/2.json", "{}");
        write(root, "negative_test/a/x.json", "{}");
        dir
    }

    #[test]
    fn stages_run_in_order() {
        let dir = corpus_dir();
        let corpus = Corpus::open(dir.path());
        let mut visitor = Recorder {
            positive: true,
            negative: true,
            ..Default::default()
        };
        let summary = Scanner::new(&corpus, ScanOptions::full())
            .run(&mut visitor)
            .unwrap();
        assert_eq!(
            visitor.events,
            vec![
                "schema a.json",
                "schema b.json",
                "schema_done",
                "folder a",
                "+ a/1.json",
                "+done a",
                "folder b",
                "+ b/1.json",
                "+ b/2.json",
                "+done b",
                "folder a",
                "- a/x.json",
                "-done a",
            ]
        );
        assert_eq!(
            summary,
            ScanSummary {
                schemas: 2,
                positive_folders: 2,
                positive_fixtures: 3,
                negative_folders: 1,
                negative_fixtures: 1,
            }
        );
    }

    #[test]
    fn unwanted_stages_are_skipped() {
        let dir = corpus_dir();
        let corpus = Corpus::open(dir.path());
        let mut visitor = Recorder::default();
        Scanner::new(&corpus, ScanOptions::full())
            .run(&mut visitor)
            .unwrap();
        assert_eq!(visitor.events, vec!["schema a.json", "schema b.json", "schema_done"]);
    }

    #[test]
    fn negative_stage_skipped_without_support() {
        let dir = corpus_dir();
        let corpus = Corpus::open(dir.path());
        let mut visitor = Recorder {
            positive: true,
            negative: true,
            ..Default::default()
        };
        let mut options = ScanOptions::full();
        options.negative_supported = false;
        let summary = Scanner::new(&corpus, options).run(&mut visitor).unwrap();
        assert_eq!(summary.negative_folders, 0);
        assert!(!visitor.events.iter().any(|e| e.starts_with('-')));
    }

    #[test]
    fn empty_folder_aborts_before_any_callback() {
        let dir = corpus_dir();
        fs::create_dir_all(dir.path().join("negative_test/b")).unwrap();
        let corpus = Corpus::open(dir.path());
        let mut visitor = Recorder {
            positive: true,
            negative: true,
            ..Default::default()
        };
        let err = Scanner::new(&corpus, ScanOptions::full())
            .run(&mut visitor)
            .unwrap_err();
        assert!(matches!(
            err,
            GateError::Structure(StructureError::EmptyFixtureFolder { ref folder, .. }) if folder == "b"
        ));
        assert!(visitor.events.is_empty());
    }

    #[test]
    fn empty_folder_in_skipped_stage_is_not_inspected() {
        let dir = corpus_dir();
        fs::create_dir_all(dir.path().join("negative_test/b")).unwrap();
        let corpus = Corpus::open(dir.path());
        let mut visitor = Recorder {
            positive: true,
            ..Default::default()
        };
        Scanner::new(&corpus, ScanOptions::full())
            .run(&mut visitor)
            .unwrap();
    }

    #[test]
    fn folder_without_schema_is_structure_error() {
        let dir = corpus_dir();
        write(dir.path(), "test/orphan/1.json", "{}");
        let corpus = Corpus::open(dir.path());
        let mut visitor = Recorder {
            positive: true,
            ..Default::default()
        };
        let err = Scanner::new(&corpus, ScanOptions::full())
            .run(&mut visitor)
            .unwrap_err();
        assert!(matches!(
            err,
            GateError::Structure(StructureError::MissingSchema { .. })
        ));
    }

    #[test]
    fn callback_error_aborts_scan() {
        struct Failing;
        impl ScanVisitor for Failing {
            fn schema(&mut self, record: &SchemaRecord) -> Result<(), GateError> {
                Err(GateError::MissingSchemaKeyword(record.location.clone()))
            }
        }
        let dir = corpus_dir();
        let corpus = Corpus::open(dir.path());
        assert!(Scanner::new(&corpus, ScanOptions::full())
            .run(&mut Failing)
            .is_err());
    }
}
