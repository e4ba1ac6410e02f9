//! Manifest and lock files as other tools write them.

use dim::error::StorageError;
use dim::preprocess::Directive;
use dim::store::{JsonLockStore, JsonManifestStore, LockStore, ManifestStore};
use dim::types::Content;
use chrono::{TimeZone, Utc};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

#[test]
fn test_reads_hand_written_files() {
    let temp = TempDir::new().unwrap();
    let manifest_path = temp.path().join("dim.json");
    let lock_path = temp.path().join("dim-lock.json");
    fs::write(
        &manifest_path,
        r#"{
  "contents": [
    { "url": "https://a/data.csv", "name": "data", "preprocesses": ["encoding-utf-8"] },
    { "url": "https://a/bare.csv" }
  ]
}"#,
    )
    .unwrap();
    fs::write(
        &lock_path,
        r#"{
  "lockFileVersion": "1.0",
  "contents": [
    {
      "url": "https://a/data.csv",
      "path": "./data_files/a/data.csv",
      "name": "data",
      "preprocesses": ["encoding-utf-8"],
      "lastUpdated": "2021-08-01T12:30:00.000Z"
    }
  ]
}"#,
    )
    .unwrap();

    let manifest = JsonManifestStore::new(&manifest_path).list_all().unwrap();
    assert_eq!(manifest.len(), 2);
    assert_eq!(manifest[0].preprocesses, Directive::parse_all(["encoding-UTF-8"]));
    assert_eq!(manifest[1].name, "");
    assert_eq!(manifest[1].display_name(), "https://a/bare.csv");
    assert!(manifest[1].preprocesses.is_empty());

    let lock = JsonLockStore::new(&lock_path).list_all().unwrap();
    assert_eq!(lock.len(), 1);
    assert_eq!(lock[0].path, PathBuf::from("./data_files/a/data.csv"));
    assert_eq!(
        lock[0].last_updated,
        Utc.with_ymd_and_hms(2021, 8, 1, 12, 30, 0).unwrap()
    );
}

#[test]
fn test_lock_round_trip_keeps_version_and_camel_case() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("dim-lock.json");
    let store = JsonLockStore::new(&path);
    let entry = dim::types::LockContent::from_content(
        &Content::new("https://a/data.csv").with_name("data"),
        PathBuf::from("data_files/a/data.csv"),
        Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap(),
    );
    store.add_one(entry.clone()).unwrap();

    let text = fs::read_to_string(&path).unwrap();
    assert!(text.contains("\"lockFileVersion\": \"1.0\""));
    assert!(text.contains("\"lastUpdated\": \"2024-01-02T03:04:05Z\""));
    assert!(!text.contains("last_updated"));

    let reread = JsonLockStore::new(&path).load().unwrap();
    assert_eq!(reread.contents, vec![entry]);
}

#[test]
fn test_malformed_lock_blocks_mutation() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("dim-lock.json");
    fs::write(&path, "[not json").unwrap();
    let store = JsonLockStore::new(&path);

    let err = store.remove_by_url("https://a/data.csv").unwrap_err();
    assert!(matches!(err, StorageError::Malformed { .. }));
    assert_eq!(fs::read_to_string(&path).unwrap(), "[not json");
}

#[test]
fn test_manifest_upsert_keeps_position() {
    let temp = TempDir::new().unwrap();
    let store = JsonManifestStore::new(temp.path().join("dim.json"));
    store
        .add_many(vec![
            Content::new("https://a/1.csv"),
            Content::new("https://a/2.csv"),
            Content::new("https://a/3.csv"),
        ])
        .unwrap();

    store
        .add_one(Content::new("https://a/2.csv").with_name("second"))
        .unwrap();

    let entries = store.list_all().unwrap();
    let names: Vec<&str> = entries.iter().map(|c| c.display_name()).collect();
    assert_eq!(names, vec!["https://a/1.csv", "second", "https://a/3.csv"]);
}
