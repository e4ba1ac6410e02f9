//! End-to-end reconciliation scenarios against JSON stores on disk.

use dim::error::DimError;
use dim::preprocess::Directive;
use dim::reconcile::{
    FileRemoval, InstallMode, ManifestInstallOutcome, UrlInstallOutcome,
};
use dim::store::{LockStore, ManifestStore};
use dim::types::{Content, LockContent};
use chrono::Utc;
use encoding_rs::SHIFT_JIS;
use std::fs;
use std::path::PathBuf;

use crate::integration::test_utils::EngineParts;
use crate::integration::Project;

const DATA_URL: &str = "https://a/data.csv";

#[tokio::test]
async fn test_empty_manifest_install_reports_no_contents() {
    let project = Project::new();
    let parts = EngineParts::new(&project, &[]);

    let outcome = parts
        .engine()
        .install_manifest(InstallMode::Install)
        .await
        .unwrap();

    assert_eq!(outcome, ManifestInstallOutcome::NoContents);
    assert!(parts.fetcher.calls().is_empty());
    assert!(!project.lock_path().exists());
}

#[tokio::test]
async fn test_manifest_install_fetches_unlocked_entry() {
    let project = Project::new();
    let parts = EngineParts::new(&project, &[(DATA_URL, b"id,value\n1,2\n")]);
    parts.manifest.add_one(Content::new(DATA_URL)).unwrap();

    let outcome = parts
        .engine()
        .install_manifest(InstallMode::Install)
        .await
        .unwrap();

    assert_eq!(outcome.installed().len(), 1);
    assert!(outcome.failures().is_empty());
    assert_eq!(parts.fetcher.calls(), vec![DATA_URL.to_string()]);

    let lock = parts.lock.list_all().unwrap();
    assert_eq!(lock.len(), 1);
    assert_eq!(lock[0].url, DATA_URL);
    assert_eq!(lock[0].path, PathBuf::from("data_files/a/data.csv"));
    assert_eq!(project.read("data_files/a/data.csv"), "id,value\n1,2\n");
}

#[tokio::test]
async fn test_install_locked_url_is_idempotent() {
    let project = Project::new();
    let parts = EngineParts::new(&project, &[(DATA_URL, b"x")]);
    let existing = LockContent::from_content(
        &Content::new(DATA_URL),
        PathBuf::from("data_files/a/data.csv"),
        Utc::now(),
    );
    parts.lock.add_one(existing.clone()).unwrap();
    let before = fs::read_to_string(project.lock_path()).unwrap();

    let outcome = parts
        .engine()
        .install_url(DATA_URL, vec![], InstallMode::Install)
        .await
        .unwrap();

    assert!(matches!(outcome, UrlInstallOutcome::AlreadyInstalled { .. }));
    assert!(parts.fetcher.calls().is_empty());
    assert_eq!(fs::read_to_string(project.lock_path()).unwrap(), before);
    assert!(!project.manifest_path().exists());
}

#[tokio::test]
async fn test_install_with_encoding_directive_reencodes_before_locking() {
    let project = Project::new();
    let (sjis, _, _) = SHIFT_JIS.encode("都市,人口\n東京,14000000\n");
    let parts = EngineParts::new(&project, &[(DATA_URL, sjis.as_ref())]);

    let outcome = parts
        .engine()
        .install_url(
            DATA_URL,
            Directive::parse_all(["encoding-utf8"]),
            InstallMode::Install,
        )
        .await
        .unwrap();

    let entry = match outcome {
        UrlInstallOutcome::Installed(entry) => entry,
        other => panic!("unexpected outcome: {:?}", other),
    };
    assert_eq!(project.read(&entry.path), "都市,人口\n東京,14000000\n");
    assert_eq!(entry.preprocesses, Directive::parse_all(["encoding-UTF8"]));

    let manifest = parts.manifest.list_all().unwrap();
    assert_eq!(manifest.len(), 1);
    assert_eq!(manifest[0].preprocesses, entry.preprocesses);
    let on_disk = fs::read_to_string(project.manifest_path()).unwrap();
    assert!(on_disk.contains("\"encoding-UTF8\""));
}

#[tokio::test]
async fn test_failed_preprocess_writes_nothing() {
    let project = Project::new();
    let parts = EngineParts::new(&project, &[(DATA_URL, b"abc")]);

    let err = parts
        .engine()
        .install_url(
            DATA_URL,
            Directive::parse_all(["encoding-no-such-charset"]),
            InstallMode::Install,
        )
        .await
        .unwrap_err();

    assert!(matches!(err, DimError::PreprocessFailed { .. }));
    assert!(parts.manifest.list_all().unwrap().is_empty());
    assert!(parts.lock.list_all().unwrap().is_empty());
}

#[tokio::test]
async fn test_batch_failure_leaves_other_entries_locked() {
    let project = Project::new();
    let parts = EngineParts::new(
        &project,
        &[("https://a/one.csv", b"1"), ("https://a/three.csv", b"3")],
    );
    parts
        .manifest
        .add_many(vec![
            Content::new("https://a/one.csv"),
            Content::new("https://a/two.csv"),
            Content::new("https://a/three.csv"),
        ])
        .unwrap();

    let outcome = parts
        .engine()
        .install_manifest(InstallMode::Install)
        .await
        .unwrap();

    assert_eq!(outcome.failures().len(), 1);
    assert_eq!(outcome.failures()[0].url, "https://a/two.csv");
    let locked: Vec<String> = parts
        .lock
        .list_all()
        .unwrap()
        .into_iter()
        .map(|c| c.url)
        .collect();
    assert_eq!(locked, vec!["https://a/one.csv", "https://a/three.csv"]);

    // A second install only retries the failed entry.
    let retry = parts
        .engine()
        .install_manifest(InstallMode::Install)
        .await
        .unwrap();
    assert_eq!(retry.failures().len(), 1);
    assert_eq!(
        parts.fetcher.calls().iter().filter(|u| u.ends_with("two.csv")).count(),
        2
    );
}

#[tokio::test]
async fn test_update_replaces_lock_entry() {
    let project = Project::new();
    let parts = EngineParts::new(&project, &[(DATA_URL, b"new")]);
    parts.manifest.add_one(Content::new(DATA_URL).with_name("data")).unwrap();
    let stale = LockContent {
        url: DATA_URL.to_string(),
        path: PathBuf::from("elsewhere/old.csv"),
        name: "old name".to_string(),
        preprocesses: Directive::parse_all(["encoding-sjis"]),
        last_updated: Utc::now() - chrono::Duration::days(30),
    };
    parts.lock.add_one(stale.clone()).unwrap();

    let outcome = parts
        .engine()
        .install_manifest(InstallMode::Update)
        .await
        .unwrap();

    assert_eq!(outcome.installed().len(), 1);
    let lock = parts.lock.list_all().unwrap();
    assert_eq!(lock.len(), 1);
    assert_eq!(lock[0].path, PathBuf::from("data_files/a/data.csv"));
    assert_eq!(lock[0].name, "data");
    assert!(lock[0].preprocesses.is_empty());
    assert!(lock[0].last_updated > stale.last_updated);
}

#[tokio::test]
async fn test_uninstall_lock_only_entry_reports_manifest_miss() {
    let project = Project::new();
    let parts = EngineParts::new(&project, &[(DATA_URL, b"x")]);
    parts
        .engine()
        .install_url(DATA_URL, vec![], InstallMode::Install)
        .await
        .unwrap();
    parts.manifest.remove_by_url(DATA_URL).unwrap();

    let outcome = parts.engine().uninstall(DATA_URL).unwrap();

    assert!(!outcome.manifest_removed);
    assert!(outcome.lock_removed);
    assert_eq!(
        outcome.file,
        FileRemoval::Deleted(PathBuf::from("data_files/a/data.csv"))
    );
    assert!(!project.data_dir().join("a/data.csv").exists());
    assert!(project.data_dir().join("a").is_dir(), "directories are kept");
    assert!(parts.lock.list_all().unwrap().is_empty());
}

#[tokio::test]
async fn test_uninstall_with_missing_file_is_clean() {
    let project = Project::new();
    let parts = EngineParts::new(&project, &[]);
    parts
        .lock
        .add_one(LockContent::from_content(
            &Content::new(DATA_URL),
            PathBuf::from("data_files/a/data.csv"),
            Utc::now(),
        ))
        .unwrap();

    let outcome = parts.engine().uninstall(DATA_URL).unwrap();

    assert_eq!(
        outcome.file,
        FileRemoval::AlreadyAbsent(PathBuf::from("data_files/a/data.csv"))
    );
}

#[tokio::test]
async fn test_status_after_partial_install() {
    let project = Project::new();
    let parts = EngineParts::new(&project, &[("https://a/one.csv", b"1")]);
    parts
        .manifest
        .add_many(vec![
            Content::new("https://a/one.csv"),
            Content::new("https://a/two.csv"),
        ])
        .unwrap();
    parts
        .engine()
        .install_manifest(InstallMode::Install)
        .await
        .unwrap();

    let report = parts.engine().check_consistency().unwrap();

    assert_eq!(report.pending.len(), 1);
    assert_eq!(report.pending[0].url, "https://a/two.csv");
    assert!(report.unmanaged.is_empty());
    assert!(report.stale.is_empty());
}
