//! Project bootstrap
//!
//! Creates the data directory and empty manifest/lock documents. `dim init`
//! writes all three; install and update only fill in what is missing.

use crate::config::PathsConfig;
use crate::error::DimError;
use crate::store::{JsonLockStore, JsonManifestStore};
use crate::types::{LockFile, ManifestFile};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Resolved on-disk locations for one project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectLayout {
    pub root: PathBuf,
    pub data_dir: PathBuf,
    pub manifest_path: PathBuf,
    pub lock_path: PathBuf,
}

impl ProjectLayout {
    pub fn from_config(root: &Path, paths: &PathsConfig) -> Self {
        let (data_dir, manifest_path, lock_path) = paths.resolve(root);
        Self {
            root: root.to_path_buf(),
            data_dir,
            manifest_path,
            lock_path,
        }
    }
}

/// Result of initialization
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InitResult {
    pub created: Vec<PathBuf>,
    pub skipped: Vec<PathBuf>,
}

/// Initialize a project. Existing manifest/lock files are kept unless `force`
/// is set, in which case they are reset to empty documents.
pub fn initialize(layout: &ProjectLayout, force: bool) -> Result<InitResult, DimError> {
    let mut result = InitResult::default();

    if layout.data_dir.is_dir() {
        result.skipped.push(layout.data_dir.clone());
    } else {
        fs::create_dir_all(&layout.data_dir)?;
        result.created.push(layout.data_dir.clone());
    }

    if layout.manifest_path.exists() && !force {
        result.skipped.push(layout.manifest_path.clone());
    } else {
        JsonManifestStore::new(&layout.manifest_path).save(&ManifestFile::default())?;
        result.created.push(layout.manifest_path.clone());
    }

    if layout.lock_path.exists() && !force {
        result.skipped.push(layout.lock_path.clone());
    } else {
        JsonLockStore::new(&layout.lock_path).save(&LockFile::default())?;
        result.created.push(layout.lock_path.clone());
    }

    info!(
        created = result.created.len(),
        skipped = result.skipped.len(),
        "Initialized project"
    );
    Ok(result)
}

/// Make sure the data directory and lock file exist before a mutating command.
/// The manifest is left alone; a missing manifest reads as empty.
pub fn ensure_layout(layout: &ProjectLayout) -> Result<(), DimError> {
    fs::create_dir_all(&layout.data_dir)?;
    if !layout.lock_path.exists() {
        debug!(path = %layout.lock_path.display(), "Creating empty lock file");
        JsonLockStore::new(&layout.lock_path).save(&LockFile::default())?;
    }
    Ok(())
}
