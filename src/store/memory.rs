//! In-memory stores for tests and embedding.

use crate::error::StorageError;
use crate::store::{remove_keyed, upsert, LockStore, ManifestStore, Upsert};
use crate::types::{Content, LockContent};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Debug, Default)]
pub struct MemoryManifestStore {
    entries: RwLock<Vec<Content>>,
    writes: AtomicUsize,
}

impl MemoryManifestStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_contents(contents: Vec<Content>) -> Self {
        Self {
            entries: RwLock::new(contents),
            writes: AtomicUsize::new(0),
        }
    }

    /// Number of mutating calls that changed or rewrote the store.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

impl ManifestStore for MemoryManifestStore {
    fn list_all(&self) -> Result<Vec<Content>, StorageError> {
        Ok(self.entries.read().clone())
    }

    fn add_one(&self, content: Content) -> Result<Upsert, StorageError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(upsert(&mut self.entries.write(), content))
    }

    fn add_many(&self, contents: Vec<Content>) -> Result<Vec<Upsert>, StorageError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        let mut entries = self.entries.write();
        Ok(contents
            .into_iter()
            .map(|c| upsert(&mut entries, c))
            .collect())
    }

    fn remove_by_url(&self, url: &str) -> Result<bool, StorageError> {
        let removed = remove_keyed(&mut self.entries.write(), url);
        if removed {
            self.writes.fetch_add(1, Ordering::SeqCst);
        }
        Ok(removed)
    }
}

#[derive(Debug, Default)]
pub struct MemoryLockStore {
    entries: RwLock<Vec<LockContent>>,
    writes: AtomicUsize,
}

impl MemoryLockStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_contents(contents: Vec<LockContent>) -> Self {
        Self {
            entries: RwLock::new(contents),
            writes: AtomicUsize::new(0),
        }
    }

    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

impl LockStore for MemoryLockStore {
    fn list_all(&self) -> Result<Vec<LockContent>, StorageError> {
        Ok(self.entries.read().clone())
    }

    fn add_one(&self, content: LockContent) -> Result<Upsert, StorageError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(upsert(&mut self.entries.write(), content))
    }

    fn add_many(&self, contents: Vec<LockContent>) -> Result<Vec<Upsert>, StorageError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        let mut entries = self.entries.write();
        Ok(contents
            .into_iter()
            .map(|c| upsert(&mut entries, c))
            .collect())
    }

    fn remove_by_url(&self, url: &str) -> Result<bool, StorageError> {
        let removed = remove_keyed(&mut self.entries.write(), url);
        if removed {
            self.writes.fetch_add(1, Ordering::SeqCst);
        }
        Ok(removed)
    }
}
