//! Reconciliation engine
//!
//! Drives fetch + preprocess for manifest entries and keeps the manifest and
//! lock stores in agreement. Storage and transport are injected as trait
//! objects so the same engine runs against JSON files and a real network, or
//! against in-memory stores and canned bodies.

use crate::error::DimError;
use crate::fetch::{parse_url, Fetcher};
use crate::preprocess::{self, Directive, Preprocessor};
use crate::reconcile::outcome::{
    ConsistencyReport, FetchFailure, FileRemoval, ListedContent, ManifestInstallOutcome,
    UninstallOutcome, UrlInstallOutcome,
};
use crate::reconcile::plan::{plan_manifest_install, InstallMode, ManifestPlan};
use crate::store::{LockStore, ManifestStore};
use crate::types::{Content, LockContent};
use chrono::Utc;
use futures::stream::{FuturesUnordered, StreamExt};
use reqwest::Url;
use std::collections::HashSet;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub struct ReconcileEngine<'a> {
    project_root: PathBuf,
    manifest: &'a dyn ManifestStore,
    lock: &'a dyn LockStore,
    fetcher: &'a dyn Fetcher,
    preprocessor: &'a dyn Preprocessor,
}

impl<'a> ReconcileEngine<'a> {
    pub fn new(
        project_root: PathBuf,
        manifest: &'a dyn ManifestStore,
        lock: &'a dyn LockStore,
        fetcher: &'a dyn Fetcher,
        preprocessor: &'a dyn Preprocessor,
    ) -> Self {
        Self {
            project_root,
            manifest,
            lock,
            fetcher,
            preprocessor,
        }
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    /// Install or update a single URL.
    ///
    /// Neither store is touched unless fetch and preprocess both succeed. On
    /// success the manifest entry is written before the lock entry.
    pub async fn install_url(
        &self,
        url: &str,
        directives: Vec<Directive>,
        mode: InstallMode,
    ) -> Result<UrlInstallOutcome, DimError> {
        let parsed = parse_url(url)?;

        if !mode.is_update() && self.lock.find(url)?.is_some() {
            info!(url = %url, "Already installed");
            return Ok(UrlInstallOutcome::AlreadyInstalled {
                url: url.to_string(),
            });
        }

        // Without explicit directives a registered entry keeps its own, in
        // both install and update mode.
        let registered = self.manifest.find(url)?;
        let directives = if directives.is_empty() {
            registered
                .as_ref()
                .map(|c| c.preprocesses.clone())
                .unwrap_or_default()
        } else {
            directives
        };
        let name = registered
            .map(|c| c.name)
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| url.to_string());
        let content = Content::new(url)
            .with_name(name)
            .with_preprocesses(directives);

        let entry = self.fetch_content(&parsed, &content).await?;

        self.manifest.add_one(content)?;
        self.lock.add_one(entry.clone())?;
        info!(url = %url, path = %entry.path.display(), update = mode.is_update(), "Installed content");

        Ok(if mode.is_update() {
            UrlInstallOutcome::Updated(entry)
        } else {
            UrlInstallOutcome::Installed(entry)
        })
    }

    /// Install (or update) everything the manifest declares.
    ///
    /// Work-set members are fetched concurrently. A failing member does not stop
    /// the others; every success is written to the lock in one batch and the
    /// failures are reported alongside.
    pub async fn install_manifest(
        &self,
        mode: InstallMode,
    ) -> Result<ManifestInstallOutcome, DimError> {
        let manifest = self.manifest.list_all()?;
        let lock = self.lock.list_all()?;

        let work_set = match plan_manifest_install(&manifest, &lock, mode) {
            ManifestPlan::NoContents => {
                info!("Manifest has no contents");
                return Ok(ManifestInstallOutcome::NoContents);
            }
            ManifestPlan::NothingToDo => {
                info!("All manifest contents are already installed");
                return Ok(ManifestInstallOutcome::NothingToDo);
            }
            ManifestPlan::Fetch(work_set) => work_set,
        };

        info!(
            count = work_set.len(),
            update = mode.is_update(),
            "Fetching manifest contents"
        );

        let mut pending = FuturesUnordered::new();
        for (index, content) in work_set.iter().enumerate() {
            pending.push(async move {
                let result = match parse_url(&content.url) {
                    Ok(url) => self.fetch_content(&url, content).await,
                    Err(err) => Err(err),
                };
                (index, result)
            });
        }

        let mut settled: Vec<(usize, LockContent)> = Vec::with_capacity(work_set.len());
        let mut failed: Vec<(usize, FetchFailure)> = Vec::new();
        while let Some((index, result)) = pending.next().await {
            let url = &work_set[index].url;
            match result {
                Ok(entry) => {
                    debug!(url = %url, path = %entry.path.display(), "Fetched");
                    settled.push((index, entry));
                }
                Err(err) => {
                    warn!(url = %url, error = %err, "Failed to install content");
                    failed.push((
                        index,
                        FetchFailure {
                            url: url.clone(),
                            reason: err.to_string(),
                        },
                    ));
                }
            }
        }
        drop(pending);

        settled.sort_by_key(|(index, _)| *index);
        failed.sort_by_key(|(index, _)| *index);
        let installed: Vec<LockContent> = settled.into_iter().map(|(_, entry)| entry).collect();
        let failures: Vec<FetchFailure> = failed.into_iter().map(|(_, f)| f).collect();

        if !installed.is_empty() {
            self.lock.add_many(installed.clone())?;
        }
        info!(
            installed = installed.len(),
            failed = failures.len(),
            "Manifest install finished"
        );

        Ok(ManifestInstallOutcome::Completed {
            installed,
            failures,
        })
    }

    /// Remove `url` from both stores and delete its downloaded file.
    ///
    /// The removals are independent; the call only fails with `NotFound` when
    /// neither store had the URL. A file another lock entry still points at is
    /// kept.
    pub fn uninstall(&self, url: &str) -> Result<UninstallOutcome, DimError> {
        let manifest_removed = self.manifest.remove_by_url(url)?;
        if !manifest_removed {
            warn!(url = %url, "Not registered in the manifest");
        }

        let locked = self.lock.find(url)?;
        let lock_removed = self.lock.remove_by_url(url)?;
        if !lock_removed {
            warn!(url = %url, "Not present in the lock file");
        }

        if !manifest_removed && !lock_removed {
            return Err(DimError::NotFound(url.to_string()));
        }

        let file = match locked {
            Some(entry) => match self.lock.list_all()?.into_iter().find(|l| l.path == entry.path) {
                Some(other) => {
                    info!(url = %url, path = %entry.path.display(), shared_with = %other.url, "Keeping file still referenced by another entry");
                    FileRemoval::StillReferenced {
                        path: entry.path,
                        by: other.url,
                    }
                }
                None => self.remove_artifact(&entry.path)?,
            },
            None => FileRemoval::NotTracked,
        };
        info!(url = %url, "Uninstalled content");

        Ok(UninstallOutcome {
            url: url.to_string(),
            manifest_removed,
            lock_removed,
            file,
        })
    }

    /// Lock entries in lock order, with on-disk presence of each file.
    pub fn list(&self) -> Result<Vec<ListedContent>, DimError> {
        let entries = self.lock.list_all()?;
        Ok(entries
            .into_iter()
            .map(|content| {
                let file_present = self.resolve(&content.path).is_file();
                if !file_present {
                    warn!(url = %content.url, path = %content.path.display(), "Installed file is missing");
                }
                ListedContent {
                    content,
                    file_present,
                }
            })
            .collect())
    }

    /// Compare manifest, lock and the data directory.
    pub fn check_consistency(&self) -> Result<ConsistencyReport, DimError> {
        let manifest = self.manifest.list_all()?;
        let lock = self.lock.list_all()?;

        let locked: HashSet<&str> = lock.iter().map(|l| l.url.as_str()).collect();
        let declared: HashSet<&str> = manifest.iter().map(|c| c.url.as_str()).collect();

        let pending = manifest
            .iter()
            .filter(|c| !locked.contains(c.url.as_str()))
            .cloned()
            .collect();
        let unmanaged = lock
            .iter()
            .filter(|l| !declared.contains(l.url.as_str()))
            .cloned()
            .collect();
        let stale = lock
            .iter()
            .filter(|l| !self.resolve(&l.path).is_file())
            .cloned()
            .collect();

        Ok(ConsistencyReport {
            pending,
            unmanaged,
            stale,
        })
    }

    /// Fetch into staging, preprocess there, and only then replace the
    /// artifact. A failed directive leaves the previous file untouched.
    async fn fetch_content(&self, url: &Url, content: &Content) -> Result<LockContent, DimError> {
        let fetched = self.fetcher.fetch(url).await?;
        if let Err(err) =
            preprocess::run_all(self.preprocessor, &fetched.staged_path, &content.preprocesses)
        {
            fetched.discard();
            return Err(err);
        }
        fetched.commit()?;
        Ok(LockContent::from_content(
            content,
            self.relativize(&fetched.full_path),
            Utc::now(),
        ))
    }

    fn remove_artifact(&self, stored: &Path) -> Result<FileRemoval, DimError> {
        let full = self.resolve(stored);
        match fs::remove_file(&full) {
            Ok(()) => {
                debug!(path = %full.display(), "Deleted file");
                Ok(FileRemoval::Deleted(stored.to_path_buf()))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %full.display(), "File already absent");
                Ok(FileRemoval::AlreadyAbsent(stored.to_path_buf()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Lock paths are stored relative to the project root when they live under it.
    fn relativize(&self, full: &Path) -> PathBuf {
        full.strip_prefix(&self.project_root)
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| full.to_path_buf())
    }

    fn resolve(&self, stored: &Path) -> PathBuf {
        self.project_root.join(stored)
    }
}

/// Log what a consistency check found. Pending and unmanaged entries are
/// normal states; missing files are not.
pub fn log_consistency(report: &ConsistencyReport) {
    for content in &report.pending {
        debug!(url = %content.url, "Declared but not installed");
    }
    for content in &report.unmanaged {
        debug!(url = %content.url, "Installed without a manifest entry");
    }
    for content in &report.stale {
        warn!(url = %content.url, path = %content.path.display(), "Installed file is missing");
    }
}
