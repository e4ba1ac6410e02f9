//! CLI tests: run the built `dim` binary against `file://` sources.

use serde_json::Value;
use std::fs;
use std::process::{Command, Output};

use crate::integration::Project;

fn dim(project: &Project, args: &[&str]) -> Output {
    let bin = env!("CARGO_BIN_EXE_dim");
    Command::new(bin)
        .env("XDG_CONFIG_HOME", &project.xdg_config_home)
        .env("HOME", &project.xdg_config_home)
        .env("NO_COLOR", "1")
        .env_remove("DIM_LOG")
        .env_remove("DIM_LOG_FORMAT")
        .env_remove("DIM_LOG_OUTPUT")
        .arg("--root")
        .arg(&project.root)
        .args(args)
        .output()
        .unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

fn lock_json(project: &Project) -> Value {
    serde_json::from_str(&fs::read_to_string(project.lock_path()).unwrap()).unwrap()
}

#[test]
fn test_init_creates_project_files() {
    let project = Project::new();

    let output = dim(&project, &["init"]);

    assert_eq!(output.status.code(), Some(0), "stderr={}", stderr(&output));
    assert!(stdout(&output).contains("Initialized the project for dim."));
    assert!(project.data_dir().is_dir());
    assert_eq!(lock_json(&project)["lockFileVersion"], "1.0");
    let manifest: Value = serde_json::from_str(&project.read("dim.json")).unwrap();
    assert_eq!(manifest["contents"], Value::Array(vec![]));
}

#[test]
fn test_install_url_then_list_and_uninstall() {
    let project = Project::new();
    let url = project.source("prices.csv", "item,price\napple,1\n");

    let installed = dim(&project, &["install", &url]);
    assert_eq!(installed.status.code(), Some(0), "stderr={}", stderr(&installed));
    assert!(stdout(&installed).contains("Installed"));

    let lock = lock_json(&project);
    assert_eq!(lock["contents"][0]["url"], url.as_str());
    let path = lock["contents"][0]["path"].as_str().unwrap().to_string();
    assert!(path.starts_with("data_files/local/"), "path={}", path);
    assert_eq!(project.read(&path), "item,price\napple,1\n");

    let again = dim(&project, &["install", &url]);
    assert_eq!(again.status.code(), Some(0));
    assert!(stdout(&again).contains("already installed"));

    let listed = dim(&project, &["list", "--format", "json"]);
    assert_eq!(listed.status.code(), Some(0));
    let value: Value = serde_json::from_str(&stdout(&listed)).unwrap();
    assert_eq!(value["contents"][0]["filePresent"], true);

    let removed = dim(&project, &["uninstall", &url]);
    assert_eq!(removed.status.code(), Some(0), "stderr={}", stderr(&removed));
    assert!(!project.root.join(&path).exists());
    assert_eq!(lock_json(&project)["contents"], Value::Array(vec![]));
}

#[test]
fn test_manifest_install_with_one_missing_source_exits_3() {
    let project = Project::new();
    let good = project.source("good.csv", "ok\n");
    let missing = reqwest::Url::from_file_path(project.sources.join("missing.csv"))
        .unwrap()
        .to_string();
    fs::write(
        project.manifest_path(),
        serde_json::json!({ "contents": [{ "url": missing }, { "url": good }] }).to_string(),
    )
    .unwrap();

    let output = dim(&project, &["install"]);

    assert_eq!(output.status.code(), Some(3), "stdout={}", stdout(&output));
    let text = stdout(&output);
    assert!(text.contains("Installed 1 of 2 contents."));
    let lock = lock_json(&project);
    assert_eq!(lock["contents"].as_array().unwrap().len(), 1);
    assert_eq!(lock["contents"][0]["url"], good.as_str());
}

#[test]
fn test_install_from_empty_manifest_is_success() {
    let project = Project::new();
    let output = dim(&project, &["install"]);
    assert_eq!(output.status.code(), Some(0));
    assert!(stdout(&output).contains("No contents"));
}

#[test]
fn test_uninstall_unknown_url_exits_4() {
    let project = Project::new();
    let output = dim(&project, &["uninstall", "https://example.com/none.csv"]);
    assert_eq!(output.status.code(), Some(4));
    assert!(stderr(&output).contains("https://example.com/none.csv"));
}

#[test]
fn test_unsupported_scheme_exits_2() {
    let project = Project::new();
    let output = dim(&project, &["install", "ftp://example.com/a.csv"]);
    assert_eq!(output.status.code(), Some(2));
    assert!(!project.manifest_path().exists());
}

#[test]
fn test_unsupported_lock_version_exits_5() {
    let project = Project::new();
    fs::write(project.lock_path(), r#"{"lockFileVersion":"2.0","contents":[]}"#).unwrap();
    let output = dim(&project, &["list"]);
    assert_eq!(output.status.code(), Some(5));
    assert!(stderr(&output).contains("2.0"));
}

#[test]
fn test_unknown_encoding_exits_6() {
    let project = Project::new();
    let url = project.source("a.txt", "abc");
    let output = dim(&project, &["install", &url, "-p", "encoding-not-a-charset"]);
    assert_eq!(output.status.code(), Some(6));
    assert!(!project.manifest_path().exists());
}

#[test]
fn test_status_json_reports_pending_entries() {
    let project = Project::new();
    fs::write(
        project.manifest_path(),
        r#"{"contents":[{"url":"https://example.com/later.csv"}]}"#,
    )
    .unwrap();

    let output = dim(&project, &["status", "--format", "json"]);

    assert_eq!(output.status.code(), Some(0));
    let value: Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(value["clean"], false);
    assert_eq!(value["pending"][0]["url"], "https://example.com/later.csv");
}

#[test]
fn test_log_output_file_writes_project_log() {
    let project = Project::new();

    let output = dim(
        &project,
        &["--log-output", "file", "--log-level", "info", "status"],
    );

    assert_eq!(output.status.code(), Some(0), "stderr={}", stderr(&output));
    let log = project.read(".dim/dim.log");
    assert!(log.contains("dim starting"), "log={}", log);
    assert!(stderr(&output).trim().is_empty());
}
