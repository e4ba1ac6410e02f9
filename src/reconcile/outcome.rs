//! Results reported by the reconciliation engine.

use crate::types::{Content, LockContent};
use serde::Serialize;
use std::path::PathBuf;

/// Result of install/update for a single URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UrlInstallOutcome {
    /// The URL is already locked and no update was requested; nothing changed.
    AlreadyInstalled { url: String },
    Installed(LockContent),
    Updated(LockContent),
}

/// One work-set member that could not be installed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FetchFailure {
    pub url: String,
    pub reason: String,
}

/// Result of a manifest-driven install/update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManifestInstallOutcome {
    NoContents,
    NothingToDo,
    /// Successes (persisted) and failures, each in work-set order.
    Completed {
        installed: Vec<LockContent>,
        failures: Vec<FetchFailure>,
    },
}

impl ManifestInstallOutcome {
    pub fn installed(&self) -> &[LockContent] {
        match self {
            ManifestInstallOutcome::Completed { installed, .. } => installed,
            _ => &[],
        }
    }

    pub fn failures(&self) -> &[FetchFailure] {
        match self {
            ManifestInstallOutcome::Completed { failures, .. } => failures,
            _ => &[],
        }
    }
}

/// What happened to the artifact of an uninstalled entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileRemoval {
    Deleted(PathBuf),
    /// The lock entry pointed at a file that was already gone.
    AlreadyAbsent(PathBuf),
    /// Another lock entry still points at the same file.
    StillReferenced { path: PathBuf, by: String },
    /// The URL had no lock entry, so there was no file to remove.
    NotTracked,
}

/// Result of uninstall. The two store removals are independent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UninstallOutcome {
    pub url: String,
    pub manifest_removed: bool,
    pub lock_removed: bool,
    pub file: FileRemoval,
}

/// Lock entry plus whether its file is still on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListedContent {
    #[serde(flatten)]
    pub content: LockContent,
    #[serde(rename = "filePresent")]
    pub file_present: bool,
}

/// Manifest/lock agreement.
///
/// `pending`: declared but not installed yet. `unmanaged`: installed without a
/// manifest entry (allowed). `stale`: locked but the file is missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConsistencyReport {
    pub pending: Vec<Content>,
    pub unmanaged: Vec<LockContent>,
    pub stale: Vec<LockContent>,
}

impl ConsistencyReport {
    /// No pending installs and no missing files.
    pub fn is_clean(&self) -> bool {
        self.pending.is_empty() && self.stale.is_empty()
    }
}
