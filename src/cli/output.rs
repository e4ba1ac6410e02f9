//! CLI output: error mapping from domain errors to stable CLI surface.

use crate::error::DimError;

pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_INVALID_INPUT: i32 = 2;
pub const EXIT_DOWNLOAD_FAILED: i32 = 3;
pub const EXIT_NOT_FOUND: i32 = 4;
pub const EXIT_STORAGE: i32 = 5;
pub const EXIT_PREPROCESS_FAILED: i32 = 6;

/// Map domain errors to a string for CLI output.
pub fn map_error(e: &DimError) -> String {
    match e {
        DimError::NotFound(url) => format!("Not installed and not in the manifest: {}", url),
        _ => e.to_string(),
    }
}

/// Process exit code for an error. Every error maps to a distinct non-zero code.
pub fn exit_code(e: &DimError) -> i32 {
    match e {
        DimError::InvalidUrl { .. } | DimError::ConfigError(_) => EXIT_INVALID_INPUT,
        DimError::DownloadFailed { .. } => EXIT_DOWNLOAD_FAILED,
        DimError::NotFound(_) => EXIT_NOT_FOUND,
        DimError::StorageError(_) => EXIT_STORAGE,
        DimError::PreprocessFailed { .. } => EXIT_PREPROCESS_FAILED,
    }
}
