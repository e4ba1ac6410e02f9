//! Download transport.
//!
//! The reconciliation engine only sees the [`Fetcher`] trait. [`HttpFetcher`]
//! is the production transport (HTTP(S) via reqwest, plus `file://` copies for
//! local sources); [`CannedFetcher`] serves fixed bodies without any I/O
//! beyond the data directory. Both leave the body staged; the caller commits it.

use crate::config::DownloadConfig;
use crate::error::DimError;
use async_trait::async_trait;
use parking_lot::Mutex;
use reqwest::{Client, Url};
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

/// Directory under the data dir that holds copies of `file://` sources.
const LOCAL_SOURCE_DIR: &str = "local";

/// File name used when a URL path ends in `/` or is empty.
const INDEX_FILE_NAME: &str = "index";

/// Hex digits of the query hash kept in file names.
const QUERY_HASH_LEN: usize = 10;

/// Result of a successful fetch.
///
/// The body sits at `staged_path` until [`FetchedFile::commit`] moves it over
/// `full_path`, so a failing preprocess never clobbers an installed artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedFile {
    pub url: Url,
    pub full_path: PathBuf,
    pub staged_path: PathBuf,
}

impl FetchedFile {
    fn staged(url: &Url, full_path: PathBuf) -> Self {
        Self {
            url: url.clone(),
            staged_path: part_path(&full_path),
            full_path,
        }
    }

    /// Move the staged body into its final location.
    pub fn commit(&self) -> Result<(), DimError> {
        commit_part(&self.url, &self.staged_path, &self.full_path)?;
        debug!(url = %self.url, path = %self.full_path.display(), "Committed download");
        Ok(())
    }

    /// Drop the staged body; the previous artifact, if any, stays in place.
    pub fn discard(&self) {
        match fs::remove_file(&self.staged_path) {
            Ok(()) => debug!(path = %self.staged_path.display(), "Discarded staged download"),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => warn!(path = %self.staged_path.display(), error = %e, "Failed to remove staged download"),
        }
    }
}

/// Download capability consumed by the reconciliation engine.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Download `url` into a staging file next to its place in the data
    /// directory. Nothing at `full_path` is touched.
    async fn fetch(&self, url: &Url) -> Result<FetchedFile, DimError>;
}

/// Parse and validate a content URL. Only http, https and file are accepted.
pub fn parse_url(raw: &str) -> Result<Url, DimError> {
    let url = Url::parse(raw).map_err(|e| DimError::InvalidUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;
    match url.scheme() {
        "http" | "https" | "file" => Ok(url),
        other => Err(DimError::InvalidUrl {
            url: raw.to_string(),
            reason: format!("unsupported scheme '{}'", other),
        }),
    }
}

/// Where `url` is stored under `data_dir`: `<data_dir>/<host>/<path...>`.
///
/// Ports are folded into the host segment (`host_8080`); `file://` sources go
/// under `<data_dir>/local/`. A query string adds a short hash of itself to
/// the file name (`data.<hash>.csv`) so URLs differing only in their query get
/// separate files.
pub fn local_path_for(data_dir: &Path, url: &Url) -> PathBuf {
    let mut path = data_dir.to_path_buf();
    match url.host_str() {
        Some(host) if url.scheme() != "file" => match url.port() {
            Some(port) => path.push(format!("{}_{}", host, port)),
            None => path.push(host),
        },
        _ => path.push(LOCAL_SOURCE_DIR),
    }

    let segments: Vec<&str> = url
        .path_segments()
        .map(|s| s.filter(|seg| !seg.is_empty() && *seg != "..").collect())
        .unwrap_or_default();
    for segment in &segments {
        path.push(segment);
    }
    if segments.is_empty() || url.path().ends_with('/') {
        path.push(INDEX_FILE_NAME);
    }

    match url.query() {
        Some(query) if !query.is_empty() => with_query_suffix(path, query),
        _ => path,
    }
}

fn with_query_suffix(path: PathBuf, query: &str) -> PathBuf {
    let hash = blake3::hash(query.as_bytes()).to_hex();
    let suffix = &hash.as_str()[..QUERY_HASH_LEN];
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match path.extension() {
        Some(ext) => format!("{}.{}.{}", stem, suffix, ext.to_string_lossy()),
        None => format!("{}.{}", stem, suffix),
    };
    path.with_file_name(name)
}

fn download_error(url: &Url, reason: impl Into<String>) -> DimError {
    DimError::DownloadFailed {
        url: url.to_string(),
        reason: reason.into(),
    }
}

// Map transport errors to DownloadFailed with a readable reason
fn map_http_error(url: &Url, error: reqwest::Error) -> DimError {
    if error.is_timeout() {
        download_error(url, format!("request timeout: {}", error))
    } else if error.is_connect() {
        download_error(url, format!("connection error: {}", error))
    } else if let Some(status) = error.status() {
        download_error(url, format!("request failed with status {}", status))
    } else {
        download_error(url, format!("HTTP error: {}", error))
    }
}

fn build_http_client(config: &DownloadConfig) -> Result<Client, DimError> {
    Client::builder()
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .user_agent(config.user_agent.clone())
        .build()
        .map_err(|e| DimError::ConfigError(format!("Failed to create HTTP client: {}", e)))
}

/// Partial-download path next to the final location.
fn part_path(target: &Path) -> PathBuf {
    let mut name = target
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".part");
    target.with_file_name(name)
}

async fn ensure_parent(url: &Url, target: &Path) -> Result<(), DimError> {
    if let Some(parent) = target.parent() {
        tokio::fs::create_dir_all(parent).await.map_err(|e| {
            download_error(
                url,
                format!("failed to create directory {}: {}", parent.display(), e),
            )
        })?;
    }
    Ok(())
}

fn commit_part(url: &Url, part: &Path, target: &Path) -> Result<(), DimError> {
    fs::rename(part, target).map_err(|e| {
        let _ = fs::remove_file(part);
        download_error(url, format!("failed to move download into place: {}", e))
    })
}

/// HTTP(S) and `file://` transport writing into a data directory.
pub struct HttpFetcher {
    client: Client,
    data_dir: PathBuf,
}

impl HttpFetcher {
    pub fn new(data_dir: PathBuf, config: &DownloadConfig) -> Result<Self, DimError> {
        Ok(Self {
            client: build_http_client(config)?,
            data_dir,
        })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    async fn fetch_http(&self, url: &Url, part: &Path) -> Result<(), DimError> {
        let mut response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| map_http_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(download_error(
                url,
                format!("request failed with status {}", status),
            ));
        }

        ensure_parent(url, part).await?;
        let mut file = tokio::fs::File::create(part)
            .await
            .map_err(|e| download_error(url, format!("failed to create {}: {}", part.display(), e)))?;

        let mut written: u64 = 0;
        loop {
            let chunk = match response.chunk().await {
                Ok(Some(chunk)) => chunk,
                Ok(None) => break,
                Err(e) => {
                    drop(file);
                    let _ = tokio::fs::remove_file(part).await;
                    return Err(map_http_error(url, e));
                }
            };
            if let Err(e) = file.write_all(&chunk).await {
                drop(file);
                let _ = tokio::fs::remove_file(part).await;
                return Err(download_error(url, format!("write failed: {}", e)));
            }
            written += chunk.len() as u64;
        }
        file.flush()
            .await
            .map_err(|e| download_error(url, format!("write failed: {}", e)))?;

        debug!(url = %url, bytes = written, "Download body written");
        Ok(())
    }

    async fn fetch_local(&self, url: &Url, part: &Path) -> Result<(), DimError> {
        let source = url
            .to_file_path()
            .map_err(|_| download_error(url, "not a valid local file path"))?;
        if !source.is_file() {
            return Err(download_error(
                url,
                format!("source file {} does not exist", source.display()),
            ));
        }
        ensure_parent(url, part).await?;
        tokio::fs::copy(&source, part)
            .await
            .map_err(|e| download_error(url, format!("copy failed: {}", e)))?;
        Ok(())
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &Url) -> Result<FetchedFile, DimError> {
        let fetched = FetchedFile::staged(url, local_path_for(&self.data_dir, url));
        info!(url = %url, path = %fetched.full_path.display(), "Downloading");
        if url.scheme() == "file" {
            self.fetch_local(url, &fetched.staged_path).await?;
        } else {
            self.fetch_http(url, &fetched.staged_path).await?;
        }
        Ok(fetched)
    }
}

/// Fetcher serving fixed bodies keyed by URL; unknown URLs fail.
///
/// Every call is recorded so callers can assert which URLs were fetched.
pub struct CannedFetcher {
    data_dir: PathBuf,
    bodies: HashMap<String, Vec<u8>>,
    calls: Mutex<Vec<String>>,
}

impl CannedFetcher {
    pub fn new(data_dir: PathBuf) -> Self {
        Self {
            data_dir,
            bodies: HashMap::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_body(mut self, url: &str, body: impl Into<Vec<u8>>) -> Self {
        self.bodies.insert(url.to_string(), body.into());
        self
    }

    /// URLs requested so far, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl Fetcher for CannedFetcher {
    async fn fetch(&self, url: &Url) -> Result<FetchedFile, DimError> {
        self.calls.lock().push(url.to_string());
        let body = self
            .bodies
            .get(url.as_str())
            .ok_or_else(|| download_error(url, "no canned response"))?;
        let fetched = FetchedFile::staged(url, local_path_for(&self.data_dir, url));
        ensure_parent(url, &fetched.staged_path).await?;
        tokio::fs::write(&fetched.staged_path, body)
            .await
            .map_err(|e| download_error(url, e.to_string()))?;
        Ok(fetched)
    }
}
