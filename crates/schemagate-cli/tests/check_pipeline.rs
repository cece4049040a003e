//! End-to-end: the local pipeline over a small store on disk.

use std::fs;
use std::path::Path;

use schemagate_cli::check::{run_check, CheckArgs, LocalTask};
use schemagate_cli::downgrade::{run_downgrade, DowngradeArgs};

const CATALOG_SCHEMA: &str = r#"{
  "$schema": "http://json-schema.org/draft-04/schema#",
  "type": "object",
  "required": ["schemas"],
  "properties": {
    "schemas": {
      "type": "array",
      "items": {"type": "object", "required": ["name", "url"]}
    }
  }
}"#;

const ADDRESS: &str = r#"{
  "$schema": "http://json-schema.org/draft-07/schema#",
  "type": "object",
  "required": ["street"],
  "properties": {"street": {"type": "string"}}
}"#;

fn write(root: &Path, rel: &str, body: &[u8]) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, body).unwrap();
}

fn store() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write(root, "schemas/json/schema-catalog.json", CATALOG_SCHEMA.as_bytes());
    write(root, "schemas/json/address.json", ADDRESS.as_bytes());
    write(root, "test/address/home.json", br#"{"street": "Main"}"#);
    write(root, "negative_test/address/number.json", br#"{"street": 7}"#);
    write(
        root,
        "api/json/catalog.json",
        br#"{
          "schemas": [
            {"name": "Address", "url": "https://json.schemastore.org/address.json", "fileMatch": ["address.json"]},
            {"name": "Catalog", "url": "https://json.schemastore.org/schema-catalog.json"},
            {"name": "Elsewhere", "url": "https://example.com/elsewhere.json"}
          ]
        }"#,
    );
    write(root, "schema-validation.json", br#"{"skiptest": []}"#);
    dir
}

#[test]
fn full_pipeline_passes() {
    let dir = store();
    let code = run_check(&CheckArgs { only: None }, dir.path()).unwrap();
    assert_eq!(code, 0);
}

#[test]
fn bom_fails_pipeline() {
    let dir = store();
    let mut body = vec![0xEF, 0xBB, 0xBF];
    body.extend_from_slice(ADDRESS.as_bytes());
    write(dir.path(), "schemas/json/address.json", &body);

    let err = run_check(&CheckArgs { only: Some(LocalTask::Bom) }, dir.path()).unwrap_err();
    assert!(format!("{err:#}").contains("BOM"));
}

#[test]
fn schema_missing_from_catalog_fails() {
    let dir = store();
    write(dir.path(), "schemas/json/orphan.json", br#"{"$schema": "http://json-schema.org/draft-07/schema#"}"#);
    let args = CheckArgs { only: Some(LocalTask::SchemaInCatalog) };
    assert!(run_check(&args, dir.path()).is_err());

    write(dir.path(), "schema-validation.json", br#"{"missingcatalogurl": ["orphan.json"]}"#);
    assert_eq!(run_check(&args, dir.path()).unwrap(), 0);
}

#[test]
fn duplicate_file_match_fails() {
    let dir = store();
    write(
        dir.path(),
        "api/json/catalog.json",
        br#"{"schemas": [
          {"name": "A", "url": "https://json.schemastore.org/address.json", "fileMatch": ["x.json"]},
          {"name": "B", "url": "https://json.schemastore.org/schema-catalog.json", "fileMatch": ["x.json"]}
        ]}"#,
    );
    let args = CheckArgs { only: Some(LocalTask::FileMatch) };
    assert!(run_check(&args, dir.path()).is_err());
}

#[test]
fn failing_positive_fixture_fails_conformance() {
    let dir = store();
    write(dir.path(), "test/address/broken.json", br#"{}"#);
    let args = CheckArgs { only: Some(LocalTask::Conformance) };
    assert!(run_check(&args, dir.path()).is_err());
}

#[test]
fn downgrade_with_fail_flag() {
    let dir = store();
    let lenient = run_downgrade(&DowngradeArgs { fail_on_findings: false }, dir.path()).unwrap();
    assert_eq!(lenient, 0);
    // address.json declares draft-07 but only uses draft-04 keywords.
    let strict = run_downgrade(&DowngradeArgs { fail_on_findings: true }, dir.path()).unwrap();
    assert_eq!(strict, 2);
}
