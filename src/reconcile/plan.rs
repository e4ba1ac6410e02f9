//! Work-set planning: which manifest entries a manifest-driven install or
//! update has to fetch.

use crate::types::{Content, LockContent};
use std::collections::HashSet;

/// Whether an operation may skip URLs that are already locked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallMode {
    /// Fetch only what is not in the lock file yet.
    Install,
    /// Re-fetch regardless of lock state.
    Update,
}

impl InstallMode {
    pub fn is_update(self) -> bool {
        matches!(self, InstallMode::Update)
    }
}

/// Result of planning a manifest-driven install/update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManifestPlan {
    /// The manifest has no entries.
    NoContents,
    /// Every manifest entry is already locked.
    NothingToDo,
    /// Entries to fetch, in manifest order.
    Fetch(Vec<Content>),
}

/// Compute the work set for `manifest` against `lock`.
///
/// Install: `{c in manifest : c.url not in lock}`. Update: the whole manifest.
pub fn plan_manifest_install(
    manifest: &[Content],
    lock: &[LockContent],
    mode: InstallMode,
) -> ManifestPlan {
    if manifest.is_empty() {
        return ManifestPlan::NoContents;
    }

    let work_set: Vec<Content> = if mode.is_update() {
        manifest.to_vec()
    } else {
        let locked: HashSet<&str> = lock.iter().map(|l| l.url.as_str()).collect();
        manifest
            .iter()
            .filter(|c| !locked.contains(c.url.as_str()))
            .cloned()
            .collect()
    };

    if work_set.is_empty() {
        ManifestPlan::NothingToDo
    } else {
        ManifestPlan::Fetch(work_set)
    }
}
