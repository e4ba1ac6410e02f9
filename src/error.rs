//! Error types for the dim data-file dependency manager.

use std::path::PathBuf;
use thiserror::Error;

/// Storage-related errors (manifest and lock files)
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Malformed {file:?}: {message}")]
    Malformed { file: PathBuf, message: String },

    #[error("Unsupported lock file version '{found}' in {file:?} (expected '{expected}')")]
    UnsupportedLockVersion {
        file: PathBuf,
        found: String,
        expected: String,
    },
}

/// Errors surfaced by reconciliation and the CLI
#[derive(Debug, Error)]
pub enum DimError {
    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Failed to download {url}: {reason}")]
    DownloadFailed { url: String, reason: String },

    #[error("Failed to preprocess {path:?} with '{directive}': {reason}")]
    PreprocessFailed {
        path: PathBuf,
        directive: String,
        reason: String,
    },

    #[error("Not found in the manifest or the lock file: {0}")]
    NotFound(String),

    #[error("Storage error: {0}")]
    StorageError(#[from] StorageError),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl From<config::ConfigError> for DimError {
    fn from(err: config::ConfigError) -> Self {
        DimError::ConfigError(err.to_string())
    }
}

impl From<std::io::Error> for DimError {
    fn from(err: std::io::Error) -> Self {
        DimError::StorageError(StorageError::IoError(err))
    }
}
