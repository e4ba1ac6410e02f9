//! Manifest/lock reconciliation.
//!
//! `plan` decides what a manifest-driven operation must fetch, `engine` drives
//! fetch + preprocess and writes both stores, `outcome` holds what callers see.

pub mod engine;
pub mod outcome;
pub mod plan;

pub use engine::ReconcileEngine;
pub use outcome::{
    ConsistencyReport, FetchFailure, FileRemoval, ListedContent, ManifestInstallOutcome,
    UninstallOutcome, UrlInstallOutcome,
};
pub use plan::{plan_manifest_install, InstallMode, ManifestPlan};
