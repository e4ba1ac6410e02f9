//! JSON file persistence for the manifest and lock stores
//!
//! Every mutation reads the whole file, applies the change in memory and
//! rewrites the whole file through a temp file + rename. There is no locking
//! against other processes.

use crate::error::StorageError;
use crate::store::{remove_keyed, upsert, LockStore, ManifestStore, Upsert};
use crate::types::{Content, LockContent, LockFile, ManifestFile, LOCK_FILE_VERSION};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Read a JSON document; a missing or blank file reads as `T::default()`.
fn read_json<T: DeserializeOwned + Default>(path: &Path) -> Result<T, StorageError> {
    if !path.exists() {
        return Ok(T::default());
    }
    let text = fs::read_to_string(path).map_err(|e| {
        StorageError::IoError(std::io::Error::new(
            e.kind(),
            format!("Failed to read {:?}: {}", path, e),
        ))
    })?;
    if text.trim().is_empty() {
        return Ok(T::default());
    }
    serde_json::from_str(&text).map_err(|e| StorageError::Malformed {
        file: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Write a JSON document with 2-space indentation.
fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), StorageError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| {
                StorageError::IoError(std::io::Error::new(
                    e.kind(),
                    format!("Failed to create parent directory {:?}: {}", parent, e),
                ))
            })?;
        }
    }

    let mut serialized = serde_json::to_string_pretty(value).map_err(|e| {
        StorageError::Malformed {
            file: path.to_path_buf(),
            message: format!("Failed to serialize: {}", e),
        }
    })?;
    serialized.push('\n');

    let temp_path = path.with_extension("json.tmp");
    fs::write(&temp_path, serialized).map_err(|e| {
        StorageError::IoError(std::io::Error::new(
            e.kind(),
            format!("Failed to write {:?}: {}", temp_path, e),
        ))
    })?;

    fs::rename(&temp_path, path).map_err(|e| {
        let _ = fs::remove_file(&temp_path);
        StorageError::IoError(std::io::Error::new(
            e.kind(),
            format!("Failed to rename temp file to {:?}: {}", path, e),
        ))
    })?;

    debug!(file = %path.display(), "Store written");
    Ok(())
}

/// File-backed manifest store (`dim.json`)
#[derive(Debug, Clone)]
pub struct JsonManifestStore {
    path: PathBuf,
}

impl JsonManifestStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<ManifestFile, StorageError> {
        read_json(&self.path)
    }

    pub fn save(&self, manifest: &ManifestFile) -> Result<(), StorageError> {
        write_json(&self.path, manifest)
    }

    fn mutate<R>(&self, f: impl FnOnce(&mut ManifestFile) -> R) -> Result<R, StorageError> {
        let mut manifest = self.load()?;
        let result = f(&mut manifest);
        self.save(&manifest)?;
        Ok(result)
    }
}

impl ManifestStore for JsonManifestStore {
    fn list_all(&self) -> Result<Vec<Content>, StorageError> {
        Ok(self.load()?.contents)
    }

    fn add_one(&self, content: Content) -> Result<Upsert, StorageError> {
        self.mutate(|m| upsert(&mut m.contents, content))
    }

    fn add_many(&self, contents: Vec<Content>) -> Result<Vec<Upsert>, StorageError> {
        self.mutate(|m| {
            contents
                .into_iter()
                .map(|c| upsert(&mut m.contents, c))
                .collect()
        })
    }

    fn remove_by_url(&self, url: &str) -> Result<bool, StorageError> {
        let mut manifest = self.load()?;
        let removed = remove_keyed(&mut manifest.contents, url);
        if removed {
            self.save(&manifest)?;
        }
        Ok(removed)
    }
}

/// File-backed lock store (`dim-lock.json`)
#[derive(Debug, Clone)]
pub struct JsonLockStore {
    path: PathBuf,
}

impl JsonLockStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the lock file, rejecting any schema version other than the current one.
    pub fn load(&self) -> Result<LockFile, StorageError> {
        let lock: LockFile = read_json(&self.path)?;
        if lock.lock_file_version != LOCK_FILE_VERSION {
            return Err(StorageError::UnsupportedLockVersion {
                file: self.path.clone(),
                found: lock.lock_file_version,
                expected: LOCK_FILE_VERSION.to_string(),
            });
        }
        Ok(lock)
    }

    pub fn save(&self, lock: &LockFile) -> Result<(), StorageError> {
        write_json(&self.path, lock)
    }

    fn mutate<R>(&self, f: impl FnOnce(&mut LockFile) -> R) -> Result<R, StorageError> {
        let mut lock = self.load()?;
        let result = f(&mut lock);
        self.save(&lock)?;
        Ok(result)
    }
}

impl LockStore for JsonLockStore {
    fn list_all(&self) -> Result<Vec<LockContent>, StorageError> {
        Ok(self.load()?.contents)
    }

    fn add_one(&self, content: LockContent) -> Result<Upsert, StorageError> {
        self.mutate(|l| upsert(&mut l.contents, content))
    }

    fn add_many(&self, contents: Vec<LockContent>) -> Result<Vec<Upsert>, StorageError> {
        self.mutate(|l| {
            contents
                .into_iter()
                .map(|c| upsert(&mut l.contents, c))
                .collect()
        })
    }

    fn remove_by_url(&self, url: &str) -> Result<bool, StorageError> {
        let mut lock = self.load()?;
        let removed = remove_keyed(&mut lock.contents, url);
        if removed {
            self.save(&lock)?;
        }
        Ok(removed)
    }
}
