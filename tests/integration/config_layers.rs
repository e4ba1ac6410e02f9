//! Integration tests for layered configuration

use dim::bootstrap::ProjectLayout;
use dim::config::{global_config_path, project_config_path, ConfigLoader};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

use crate::integration::with_xdg_env;

#[test]
fn test_project_file_overrides_global_file() {
    let test_dir = TempDir::new().unwrap();
    let root = test_dir.path().join("project");
    fs::create_dir_all(&root).unwrap();

    with_xdg_env(&test_dir, || {
        let global = global_config_path().unwrap();
        assert!(global.starts_with(test_dir.path().join("config")));
        fs::create_dir_all(global.parent().unwrap()).unwrap();
        fs::write(
            &global,
            "[paths]\ndata_dir = \"global_data\"\nmanifest_file = \"global.json\"\n\n[download]\nconnect_timeout_secs = 3\n",
        )
        .unwrap();

        let project = project_config_path(&root);
        fs::create_dir_all(project.parent().unwrap()).unwrap();
        fs::write(&project, "[paths]\nmanifest_file = \"deps/dim.json\"\n").unwrap();

        let config = ConfigLoader::load(&root).unwrap();
        assert_eq!(config.paths.data_dir, PathBuf::from("global_data"));
        assert_eq!(config.paths.manifest_file, PathBuf::from("deps/dim.json"));
        assert_eq!(config.download.connect_timeout_secs, 3);
        assert_eq!(config.download.request_timeout_secs, 300);

        let layout = ProjectLayout::from_config(&root, &config.paths);
        assert_eq!(layout.manifest_path, root.join("deps/dim.json"));
        assert_eq!(layout.data_dir, root.join("global_data"));
    });
}

#[test]
fn test_environment_overrides_files() {
    let test_dir = TempDir::new().unwrap();
    let root = test_dir.path().join("project");
    fs::create_dir_all(&root).unwrap();

    with_xdg_env(&test_dir, || {
        let project = project_config_path(&root);
        fs::create_dir_all(project.parent().unwrap()).unwrap();
        fs::write(&project, "[download]\nrequest_timeout_secs = 60\n").unwrap();

        std::env::set_var("DIM__DOWNLOAD__REQUEST_TIMEOUT_SECS", "45");
        let config = ConfigLoader::load(&root);
        std::env::remove_var("DIM__DOWNLOAD__REQUEST_TIMEOUT_SECS");

        assert_eq!(config.unwrap().download.request_timeout_secs, 45);
    });
}

#[test]
fn test_defaults_without_any_file() {
    let test_dir = TempDir::new().unwrap();
    let root = test_dir.path().join("project");
    fs::create_dir_all(&root).unwrap();

    with_xdg_env(&test_dir, || {
        let config = ConfigLoader::load(&root).unwrap();
        assert_eq!(config.paths.data_dir, PathBuf::from("data_files"));
        assert_eq!(config.logging.level, "warn");
        assert_eq!(config.logging.output, "stderr");
    });
}

#[test]
fn test_explicit_missing_config_file_is_error() {
    let test_dir = TempDir::new().unwrap();
    assert!(ConfigLoader::load_from_file(&test_dir.path().join("absent.toml")).is_err());
}
