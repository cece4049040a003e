//! # Corpus Model
//!
//! Read-only view of the corpus layout:
//!
//! ```text
//! <root>/schemas/json/<name>.json        one schema per logical name
//! <root>/test/<name>/*.json              positive fixtures
//! <root>/negative_test/<name>/*.json     negative fixtures
//! ```
//!
//! Entries are always returned sorted by name so every pass visits the
//! corpus in the same order. Records are read fresh on every call; nothing
//! is cached across passes.
//!
//! The [`Inclusion`] predicate decides whether a file reaches a visitor.
//! It is applied identically to schema files and fixture folders so a
//! schema and its fixtures are never split.

use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::error::{GateError, StructureError};

/// OS artifact that is never part of the corpus.
pub const SYSTEM_ARTIFACT: &str = ".DS_Store";

/// Returns true for file names that must always be ignored.
pub fn is_system_artifact(name: &str) -> bool {
    name == SYSTEM_ARTIFACT
}

/// Kind of a directory entry, as seen without following symlinks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// Regular file.
    File,
    /// Directory.
    Directory,
    /// Symlink, socket, or anything else.
    Other,
}

/// Corpus storage capability: local, read-only.
pub trait Storage {
    /// List the entries of `dir`, sorted by name.
    fn list(&self, dir: &Path) -> std::io::Result<Vec<(String, EntryKind)>>;

    /// Read a file's raw bytes.
    fn read(&self, path: &Path) -> std::io::Result<Vec<u8>>;

    /// Kind of the entry at `path`, or `None` if it does not exist.
    fn kind(&self, path: &Path) -> Option<EntryKind>;
}

/// [`Storage`] backed by the local file system.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsStorage;

fn kind_of(metadata: &std::fs::Metadata) -> EntryKind {
    if metadata.is_file() {
        EntryKind::File
    } else if metadata.is_dir() {
        EntryKind::Directory
    } else {
        EntryKind::Other
    }
}

impl Storage for FsStorage {
    fn list(&self, dir: &Path) -> std::io::Result<Vec<(String, EntryKind)>> {
        let mut entries = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().into_owned();
            let kind = kind_of(&std::fs::symlink_metadata(entry.path())?);
            entries.push((name, kind));
        }
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(entries)
    }

    fn read(&self, path: &Path) -> std::io::Result<Vec<u8>> {
        std::fs::read(path)
    }

    fn kind(&self, path: &Path) -> Option<EntryKind> {
        std::fs::symlink_metadata(path).ok().map(|m| kind_of(&m))
    }
}

/// Fixture polarity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Polarity {
    /// Fixture must validate.
    Positive,
    /// Fixture must fail validation.
    Negative,
}

impl fmt::Display for Polarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Polarity::Positive => f.write_str("positive"),
            Polarity::Negative => f.write_str("negative"),
        }
    }
}

/// Directory conventions of a corpus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorpusLayout {
    /// Directory holding `<name>.json` schema files.
    pub schema_dir: PathBuf,
    /// Root of the positive fixture folders.
    pub positive_dir: PathBuf,
    /// Root of the negative fixture folders.
    pub negative_dir: PathBuf,
}

impl CorpusLayout {
    /// The standard layout under a repository root.
    pub fn under(root: &Path) -> Self {
        Self {
            schema_dir: root.join("schemas").join("json"),
            positive_dir: root.join("test"),
            negative_dir: root.join("negative_test"),
        }
    }

    /// Root directory for fixtures of the given polarity.
    pub fn fixture_dir(&self, polarity: Polarity) -> &Path {
        match polarity {
            Polarity::Positive => &self.positive_dir,
            Polarity::Negative => &self.negative_dir,
        }
    }
}

/// A schema document as read from the corpus or fetched remotely.
#[derive(Debug, Clone)]
pub struct SchemaRecord {
    /// Logical name: file name without extension.
    pub name: String,
    /// File name, e.g. `address.json`.
    pub file_name: String,
    /// Path or URL the bytes came from.
    pub location: String,
    /// Raw bytes, BOM included.
    pub raw: Vec<u8>,
}

impl SchemaRecord {
    /// Create a record, deriving the logical name from `file_name`.
    pub fn new(file_name: impl Into<String>, location: impl Into<String>, raw: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let name = Path::new(&file_name)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| file_name.clone());
        Self {
            name,
            file_name,
            location: location.into(),
            raw,
        }
    }

    /// Parse the raw bytes as JSON.
    pub fn parse(&self) -> Result<Value, GateError> {
        serde_json::from_slice(&self.raw).map_err(|source| GateError::Parse {
            location: self.location.clone(),
            source,
        })
    }
}

/// A test fixture.
#[derive(Debug, Clone)]
pub struct FixtureRecord {
    /// Full path of the fixture file.
    pub path: PathBuf,
    /// File name inside its folder.
    pub file_name: String,
    /// Raw bytes.
    pub raw: Vec<u8>,
    /// Positive or negative.
    pub polarity: Polarity,
    /// Owning folder name, equal to the schema's logical name.
    pub owner: String,
}

impl FixtureRecord {
    /// Parse the fixture as JSON, ignoring a leading UTF-8 BOM.
    pub fn parse(&self) -> Result<Value, GateError> {
        let bytes = self
            .raw
            .strip_prefix(&[0xEF, 0xBB, 0xBF][..])
            .unwrap_or(&self.raw);
        serde_json::from_slice(bytes).map_err(|source| GateError::Parse {
            location: self.path.display().to_string(),
            source,
        })
    }
}

/// How files are selected for a scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanMode {
    /// Every non-skipped file qualifies.
    Full,
    /// A file qualifies only if its membership in the partition list
    /// equals `member`.
    Partitioned {
        /// Required partition membership.
        member: bool,
    },
}

/// The inclusion predicate applied to every schema file and fixture folder.
#[derive(Debug, Clone)]
pub struct Inclusion {
    /// Selection mode.
    pub mode: ScanMode,
    /// File names that are never processed.
    pub skip: BTreeSet<String>,
    /// File names claimed by the partition.
    pub partition: BTreeSet<String>,
}

impl Inclusion {
    /// Full scan with no exemptions.
    pub fn full() -> Self {
        Self {
            mode: ScanMode::Full,
            skip: BTreeSet::new(),
            partition: BTreeSet::new(),
        }
    }

    /// Whether a schema file name (`<name>.json`) qualifies.
    pub fn admits(&self, file_name: &str) -> bool {
        if is_system_artifact(file_name) || self.skip.contains(file_name) {
            return false;
        }
        match self.mode {
            ScanMode::Full => true,
            ScanMode::Partitioned { member } => self.partition.contains(file_name) == member,
        }
    }

    /// Whether a fixture folder qualifies, judged by its schema file name.
    pub fn admits_folder(&self, folder: &str) -> bool {
        !is_system_artifact(folder) && self.admits(&format!("{folder}.json"))
    }
}

/// Read-only access to a corpus through a [`Storage`].
#[derive(Debug, Clone)]
pub struct Corpus<S = FsStorage> {
    layout: CorpusLayout,
    storage: S,
}

impl Corpus<FsStorage> {
    /// Open the standard layout under `root` on the local file system.
    pub fn open(root: &Path) -> Self {
        Self::new(CorpusLayout::under(root), FsStorage)
    }
}

impl<S: Storage> Corpus<S> {
    /// Create a corpus view over an explicit layout and storage.
    pub fn new(layout: CorpusLayout, storage: S) -> Self {
        Self { layout, storage }
    }

    /// The directory conventions in use.
    pub fn layout(&self) -> &CorpusLayout {
        &self.layout
    }

    /// The underlying storage.
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Path of the schema file for a logical name.
    pub fn schema_path(&self, name: &str) -> PathBuf {
        self.layout.schema_dir.join(format!("{name}.json"))
    }

    fn list_dir(&self, dir: &Path) -> Result<Vec<(String, EntryKind)>, GateError> {
        if self.storage.kind(dir) != Some(EntryKind::Directory) {
            return Err(StructureError::MissingDirectory(dir.to_path_buf()).into());
        }
        self.storage.list(dir).map_err(|e| GateError::io(dir, e))
    }

    /// File names in the schema directory, artifacts filtered.
    ///
    /// # Errors
    ///
    /// [`StructureError::NotAFile`] if any other entry is not a regular file.
    pub fn list_schema_files(&self) -> Result<Vec<String>, GateError> {
        let dir = &self.layout.schema_dir;
        let mut files = Vec::new();
        for (name, kind) in self.list_dir(dir)? {
            if is_system_artifact(&name) {
                continue;
            }
            if kind != EntryKind::File {
                return Err(StructureError::NotAFile {
                    dir: dir.clone(),
                    name,
                }
                .into());
            }
            files.push(name);
        }
        Ok(files)
    }

    /// Read one schema file by file name.
    pub fn read_schema(&self, file_name: &str) -> Result<SchemaRecord, GateError> {
        let path = self.layout.schema_dir.join(file_name);
        let raw = self.storage.read(&path).map_err(|e| GateError::io(&path, e))?;
        Ok(SchemaRecord::new(file_name, path.display().to_string(), raw))
    }

    /// Read the schema file that owns a fixture folder.
    ///
    /// # Errors
    ///
    /// [`StructureError::MissingSchema`] if `<folder>.json` is not a file.
    pub fn read_folder_schema(&self, folder: &str) -> Result<SchemaRecord, GateError> {
        let path = self.schema_path(folder);
        if self.storage.kind(&path) != Some(EntryKind::File) {
            return Err(StructureError::MissingSchema {
                folder: folder.to_string(),
                path,
            }
            .into());
        }
        self.read_schema(&format!("{folder}.json"))
    }

    /// Folder names under a fixture root, artifacts filtered.
    ///
    /// # Errors
    ///
    /// [`StructureError::NotADirectory`] if any other entry is not a directory.
    pub fn list_fixture_folders(&self, polarity: Polarity) -> Result<Vec<String>, GateError> {
        let dir = self.layout.fixture_dir(polarity);
        let mut folders = Vec::new();
        for (name, kind) in self.list_dir(dir)? {
            if is_system_artifact(&name) {
                continue;
            }
            if kind != EntryKind::Directory {
                return Err(StructureError::NotADirectory {
                    dir: dir.to_path_buf(),
                    name,
                }
                .into());
            }
            folders.push(name);
        }
        Ok(folders)
    }

    /// File names inside one fixture folder.
    ///
    /// # Errors
    ///
    /// [`StructureError::NotADirectory`] if the folder is not a directory,
    /// [`StructureError::NotAFile`] for nested non-file entries and
    /// [`StructureError::EmptyFixtureFolder`] if it holds no files.
    pub fn list_fixture_files(
        &self,
        polarity: Polarity,
        folder: &str,
    ) -> Result<Vec<String>, GateError> {
        let root = self.layout.fixture_dir(polarity);
        let dir = root.join(folder);
        if self.storage.kind(&dir) != Some(EntryKind::Directory) {
            return Err(StructureError::NotADirectory {
                dir: root.to_path_buf(),
                name: folder.to_string(),
            }
            .into());
        }
        let mut files = Vec::new();
        for (name, kind) in self.storage.list(&dir).map_err(|e| GateError::io(&dir, e))? {
            if is_system_artifact(&name) {
                continue;
            }
            if kind != EntryKind::File {
                return Err(StructureError::NotAFile {
                    dir: dir.clone(),
                    name,
                }
                .into());
            }
            files.push(name);
        }
        if files.is_empty() {
            return Err(StructureError::EmptyFixtureFolder {
                folder: folder.to_string(),
                dir,
            }
            .into());
        }
        Ok(files)
    }

    /// Read every fixture of one folder, in name order.
    pub fn read_fixtures(
        &self,
        polarity: Polarity,
        folder: &str,
    ) -> Result<Vec<FixtureRecord>, GateError> {
        let dir = self.layout.fixture_dir(polarity).join(folder);
        self.list_fixture_files(polarity, folder)?
            .into_iter()
            .map(|file_name| {
                let path = dir.join(&file_name);
                let raw = self.storage.read(&path).map_err(|e| GateError::io(&path, e))?;
                Ok(FixtureRecord {
                    path,
                    file_name,
                    raw,
                    polarity,
                    owner: folder.to_string(),
                })
            })
            .collect()
    }

    /// Validate the whole layout: schema entries are files and every
    /// fixture root holds only directories.
    pub fn validate_structure(&self) -> Result<(), GateError> {
        self.list_schema_files()?;
        self.list_fixture_folders(Polarity::Positive)?;
        self.list_fixture_folders(Polarity::Negative)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn corpus_fixture() -> (tempfile::TempDir, Corpus) {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("schemas/json")).unwrap();
        fs::create_dir_all(root.join("test/b")).unwrap();
        fs::create_dir_all(root.join("negative_test")).unwrap();
        fs::write(root.join("schemas/json/b.json"), b"{}").unwrap();
        fs::write(root.join("schemas/json/a.json"), b"{}").unwrap();
        fs::write(root.join("schemas/json/.DS_Store"), b"").unwrap();
        fs::write(root.join("test/b/2.json"), b"{}").unwrap();
        fs::write(root.join("test/b/1.json"), b"\xEF\xBB\xBF{\"x\": 1}").unwrap();
        let corpus = Corpus::open(root);
        (dir, corpus)
    }

    #[test]
    fn schema_files_sorted_and_filtered() {
        let (_dir, corpus) = corpus_fixture();
        assert_eq!(corpus.list_schema_files().unwrap(), vec!["a.json", "b.json"]);
    }

    #[test]
    fn schema_record_name_strips_extension() {
        let (_dir, corpus) = corpus_fixture();
        let record = corpus.read_schema("a.json").unwrap();
        assert_eq!(record.name, "a");
        assert_eq!(record.file_name, "a.json");
        assert!(record.parse().unwrap().is_object());
    }

    #[test]
    fn directory_in_schema_dir_is_structure_error() {
        let (dir, corpus) = corpus_fixture();
        fs::create_dir(dir.path().join("schemas/json/nested")).unwrap();
        let err = corpus.list_schema_files().unwrap_err();
        assert!(matches!(
            err,
            GateError::Structure(StructureError::NotAFile { ref name, .. }) if name == "nested"
        ));
    }

    #[test]
    fn file_in_fixture_root_is_structure_error() {
        let (dir, corpus) = corpus_fixture();
        fs::write(dir.path().join("test/stray.json"), b"{}").unwrap();
        let err = corpus.list_fixture_folders(Polarity::Positive).unwrap_err();
        assert!(matches!(
            err,
            GateError::Structure(StructureError::NotADirectory { .. })
        ));
    }

    #[test]
    fn fixtures_read_in_name_order_with_bom_stripped() {
        let (_dir, corpus) = corpus_fixture();
        let fixtures = corpus.read_fixtures(Polarity::Positive, "b").unwrap();
        let names: Vec<_> = fixtures.iter().map(|f| f.file_name.as_str()).collect();
        assert_eq!(names, vec!["1.json", "2.json"]);
        assert_eq!(fixtures[0].parse().unwrap()["x"], 1);
        assert_eq!(fixtures[0].owner, "b");
    }

    #[test]
    fn empty_fixture_folder_is_structure_error() {
        let (dir, corpus) = corpus_fixture();
        fs::create_dir(dir.path().join("negative_test/a")).unwrap();
        let err = corpus.read_fixtures(Polarity::Negative, "a").unwrap_err();
        assert!(matches!(
            err,
            GateError::Structure(StructureError::EmptyFixtureFolder { ref folder, .. }) if folder == "a"
        ));
    }

    #[test]
    fn missing_folder_schema_is_structure_error() {
        let (_dir, corpus) = corpus_fixture();
        let err = corpus.read_folder_schema("zzz").unwrap_err();
        assert!(matches!(
            err,
            GateError::Structure(StructureError::MissingSchema { .. })
        ));
    }

    #[test]
    fn missing_root_is_structure_error() {
        let dir = tempfile::tempdir().unwrap();
        let corpus = Corpus::open(dir.path());
        assert!(matches!(
            corpus.list_schema_files().unwrap_err(),
            GateError::Structure(StructureError::MissingDirectory(_))
        ));
    }

    #[test]
    fn inclusion_full_mode_honours_skip_list() {
        let mut inclusion = Inclusion::full();
        inclusion.skip.insert("skipped.json".into());
        assert!(inclusion.admits("a.json"));
        assert!(!inclusion.admits("skipped.json"));
        assert!(!inclusion.admits(".DS_Store"));
        assert!(!inclusion.admits_folder("skipped"));
    }

    #[test]
    fn inclusion_partition_is_complementary() {
        let partition: BTreeSet<String> = ["legacy.json".to_string()].into();
        let members = Inclusion {
            mode: ScanMode::Partitioned { member: true },
            skip: BTreeSet::new(),
            partition: partition.clone(),
        };
        let others = Inclusion {
            mode: ScanMode::Partitioned { member: false },
            skip: BTreeSet::new(),
            partition,
        };
        for name in ["legacy.json", "modern.json"] {
            assert_ne!(members.admits(name), others.admits(name));
        }
        assert!(members.admits_folder("legacy"));
        assert!(others.admits_folder("modern"));
    }
}
