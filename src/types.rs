//! Manifest and lock records.
//!
//! `Content` is what the user asked for; `LockContent` is what was actually
//! fetched. Both are keyed by `url` inside their store.

use crate::preprocess::Directive;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Schema tag written into every lock file.
pub const LOCK_FILE_VERSION: &str = "1.0";

/// Record addressed by URL inside a store.
pub trait Keyed {
    fn url(&self) -> &str;
}

/// Manifest entry: a desired remote data file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Content {
    pub url: String,
    /// Display label; empty means "use the url".
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub preprocesses: Vec<Directive>,
}

impl Content {
    pub fn new(url: impl Into<String>) -> Self {
        let url = url.into();
        Self {
            name: url.clone(),
            url,
            preprocesses: Vec::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_preprocesses(mut self, preprocesses: Vec<Directive>) -> Self {
        self.preprocesses = preprocesses;
        self
    }

    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            &self.url
        } else {
            &self.name
        }
    }
}

impl Keyed for Content {
    fn url(&self) -> &str {
        &self.url
    }
}

/// Lock entry: a data file that was fetched and where it landed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LockContent {
    pub url: String,
    pub path: PathBuf,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub preprocesses: Vec<Directive>,
    pub last_updated: DateTime<Utc>,
}

impl LockContent {
    /// Build a fresh lock entry for `content`. Never merges with a previous entry.
    pub fn from_content(content: &Content, path: PathBuf, last_updated: DateTime<Utc>) -> Self {
        Self {
            url: content.url.clone(),
            path,
            name: content.display_name().to_string(),
            preprocesses: content.preprocesses.clone(),
            last_updated,
        }
    }

    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            &self.url
        } else {
            &self.name
        }
    }
}

impl Keyed for LockContent {
    fn url(&self) -> &str {
        &self.url
    }
}

/// On-disk shape of `dim.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestFile {
    #[serde(default)]
    pub contents: Vec<Content>,
}

/// On-disk shape of `dim-lock.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LockFile {
    pub lock_file_version: String,
    #[serde(default)]
    pub contents: Vec<LockContent>,
}

impl Default for LockFile {
    fn default() -> Self {
        Self {
            lock_file_version: LOCK_FILE_VERSION.to_string(),
            contents: Vec::new(),
        }
    }
}
