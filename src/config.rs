//! Configuration System
//!
//! Layered configuration for dim: built-in defaults, the user's global config
//! file, the project's `.dim/config.toml`, then `DIM__SECTION__KEY` environment
//! variables. Relative paths are resolved against the project root.

use crate::logging::LoggingConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

mod facade;
mod sources {
    pub mod global_file;
    pub mod project_file;
}

pub use facade::ConfigLoader;
pub use sources::global_file::global_config_path;
pub use sources::project_file::project_config_path;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DimConfig {
    /// Manifest, lock and data locations
    #[serde(default)]
    pub paths: PathsConfig,

    /// Download transport settings
    #[serde(default)]
    pub download: DownloadConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// File locations, relative to the project root unless absolute
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default = "default_manifest_file")]
    pub manifest_file: PathBuf,

    #[serde(default = "default_lock_file")]
    pub lock_file: PathBuf,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data_files")
}

fn default_manifest_file() -> PathBuf {
    PathBuf::from("dim.json")
}

fn default_lock_file() -> PathBuf {
    PathBuf::from("dim-lock.json")
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            manifest_file: default_manifest_file(),
            lock_file: default_lock_file(),
        }
    }
}

impl PathsConfig {
    /// Resolve (data_dir, manifest, lock) against `root`.
    pub fn resolve(&self, root: &Path) -> (PathBuf, PathBuf, PathBuf) {
        (
            root.join(&self.data_dir),
            root.join(&self.manifest_file),
            root.join(&self.lock_file),
        )
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.data_dir.as_os_str().is_empty() {
            return Err("Data directory cannot be empty".to_string());
        }
        if self.manifest_file.as_os_str().is_empty() {
            return Err("Manifest file path cannot be empty".to_string());
        }
        if self.lock_file.as_os_str().is_empty() {
            return Err("Lock file path cannot be empty".to_string());
        }
        if self.manifest_file == self.lock_file {
            return Err("Manifest and lock file must be different files".to_string());
        }
        Ok(())
    }
}

/// Download transport settings. Timeouts are the only ones applied anywhere.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadConfig {
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_request_timeout_secs() -> u64 {
    300
}

fn default_user_agent() -> String {
    format!("dim/{}", env!("CARGO_PKG_VERSION"))
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: default_connect_timeout_secs(),
            request_timeout_secs: default_request_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

impl DownloadConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.connect_timeout_secs == 0 {
            return Err("connect_timeout_secs must be greater than zero".to_string());
        }
        if self.request_timeout_secs == 0 {
            return Err("request_timeout_secs must be greater than zero".to_string());
        }
        Ok(())
    }
}

/// Configuration validation errors
#[derive(Debug, Clone)]
pub enum ValidationError {
    Paths(String),
    Download(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::Paths(msg) => write!(f, "paths: {}", msg),
            ValidationError::Download(msg) => write!(f, "download: {}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}

impl DimConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if let Err(e) = self.paths.validate() {
            errors.push(ValidationError::Paths(e));
        }
        if let Err(e) = self.download.validate() {
            errors.push(ValidationError::Download(e));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
