//! Manifest and lock stores
//!
//! Both stores hold an ordered list of entries keyed by URL. Adding an entry
//! whose URL is already present replaces it in place, so a URL appears at most
//! once per store.

pub mod memory;
pub mod persistence;

pub use memory::{MemoryLockStore, MemoryManifestStore};
pub use persistence::{JsonLockStore, JsonManifestStore};

use crate::error::StorageError;
use crate::types::{Content, Keyed, LockContent};

/// What an add did to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    Inserted,
    Replaced,
}

/// Desired contents (`dim.json`)
pub trait ManifestStore: Send + Sync {
    fn list_all(&self) -> Result<Vec<Content>, StorageError>;

    fn find(&self, url: &str) -> Result<Option<Content>, StorageError> {
        Ok(self.list_all()?.into_iter().find(|c| c.url == url))
    }

    fn add_one(&self, content: Content) -> Result<Upsert, StorageError>;

    fn add_many(&self, contents: Vec<Content>) -> Result<Vec<Upsert>, StorageError>;

    /// Remove the entry for `url`; returns whether one was found.
    fn remove_by_url(&self, url: &str) -> Result<bool, StorageError>;
}

/// Installed contents (`dim-lock.json`)
pub trait LockStore: Send + Sync {
    fn list_all(&self) -> Result<Vec<LockContent>, StorageError>;

    fn find(&self, url: &str) -> Result<Option<LockContent>, StorageError> {
        Ok(self.list_all()?.into_iter().find(|c| c.url == url))
    }

    fn add_one(&self, content: LockContent) -> Result<Upsert, StorageError>;

    fn add_many(&self, contents: Vec<LockContent>) -> Result<Vec<Upsert>, StorageError>;

    /// Remove the entry for `url`; returns whether one was found.
    fn remove_by_url(&self, url: &str) -> Result<bool, StorageError>;
}

/// Replace the entry with the same URL, or append.
pub(crate) fn upsert<T: Keyed>(entries: &mut Vec<T>, entry: T) -> Upsert {
    match entries.iter().position(|e| e.url() == entry.url()) {
        Some(index) => {
            entries[index] = entry;
            Upsert::Replaced
        }
        None => {
            entries.push(entry);
            Upsert::Inserted
        }
    }
}

pub(crate) fn remove_keyed<T: Keyed>(entries: &mut Vec<T>, url: &str) -> bool {
    let before = entries.len();
    entries.retain(|e| e.url() != url);
    entries.len() != before
}
