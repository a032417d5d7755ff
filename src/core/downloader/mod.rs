// ─── Artifact Store ───
// Content-addressed fetch / verify / cache of single files.

mod archive;
mod client;
#[cfg(test)]
pub(crate) mod fake;

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use futures_util::stream::{self, StreamExt};
use sha1::{Digest, Sha1};
use tokio::io::AsyncReadExt;
use tracing::debug;

use crate::core::error::{LauncherError, LauncherResult};
use crate::core::progress::{fraction, Progress};

pub use archive::is_excluded;
pub use client::Downloader;

/// Default number of parallel transfers.
pub const DEFAULT_CONCURRENCY: usize = 8;

/// Source of remote bytes plus the cache semantics built on top of it.
///
/// Implementors provide the two transport primitives; the verify-then-write
/// logic lives in the provided methods so every store caches the same way.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Fetch a whole resource into memory.
    async fn fetch_bytes(&self, url: &str) -> LauncherResult<Vec<u8>>;

    /// Stream `url` into `dest`, creating parent directories.
    /// Returns the lowercase hex SHA-1 of what was written.
    async fn download_to(&self, url: &str, dest: &Path) -> LauncherResult<String>;

    /// Maximum number of transfers to run at once.
    fn concurrency(&self) -> usize {
        DEFAULT_CONCURRENCY
    }

    /// Cache hit when `dest` already hashes to `sha1`, download otherwise.
    async fn check_or_download(&self, url: &str, sha1: &str, dest: &Path) -> LauncherResult<()> {
        self.check_or_download_any(url, &[sha1], dest).await
    }

    /// Like [`ArtifactStore::check_or_download`] but accepts any of `hashes`.
    /// An empty list degrades to [`ArtifactStore::exists_or_download`].
    async fn check_or_download_any(
        &self,
        url: &str,
        hashes: &[&str],
        dest: &Path,
    ) -> LauncherResult<()> {
        if hashes.is_empty() {
            return self.exists_or_download(url, dest).await;
        }

        if let Some(actual) = file_sha1(dest).await? {
            if matches_any(&actual, hashes) {
                debug!("Cache hit: {:?}", dest);
                return Ok(());
            }
            debug!("Stale file {:?} ({}), downloading again", dest, actual);
        }

        let actual = self.download_to(url, dest).await?;
        if matches_any(&actual, hashes) {
            Ok(())
        } else {
            Err(LauncherError::Sha1Mismatch {
                path: dest.to_path_buf(),
                expected: hashes.join(" | "),
                actual,
            })
        }
    }

    /// Presence-only check for sources that publish no checksum.
    async fn exists_or_download(&self, url: &str, dest: &Path) -> LauncherResult<()> {
        let exists = tokio::fs::try_exists(dest)
            .await
            .map_err(|e| LauncherError::io(dest, e))?;
        if exists {
            debug!("Present, not verified: {:?}", dest);
            return Ok(());
        }
        self.download_to(url, dest).await.map(|_| ())
    }

    /// Unpack a zip archive under `dest`, skipping entries matching `exclude`.
    async fn unpack_archive(
        &self,
        archive: &Path,
        dest: &Path,
        exclude: &[String],
    ) -> LauncherResult<()> {
        archive::unpack(archive, dest, exclude).await.map(|_| ())
    }
}

/// A single file to fetch with an optional SHA-1 for validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadEntry {
    pub url: String,
    pub dest: PathBuf,
    pub sha1: Option<String>,
}

impl DownloadEntry {
    pub fn new(url: impl Into<String>, dest: impl Into<PathBuf>, sha1: Option<String>) -> Self {
        Self {
            url: url.into(),
            dest: dest.into(),
            sha1,
        }
    }

    pub async fn fetch(&self, store: &dyn ArtifactStore) -> LauncherResult<()> {
        match &self.sha1 {
            Some(sha1) => store.check_or_download(&self.url, sha1, &self.dest).await,
            None => store.exists_or_download(&self.url, &self.dest).await,
        }
    }
}

/// Fetch many entries with bounded concurrency.
///
/// Results are consumed in input order; the first failure aborts the batch.
/// Progress is reported once per finished entry.
pub async fn download_batch(
    store: &dyn ArtifactStore,
    entries: &[DownloadEntry],
    progress: &dyn Progress,
) -> LauncherResult<()> {
    let total = entries.len();
    debug!(
        "Starting batch download: {} files, concurrency={}",
        total,
        store.concurrency()
    );

    let mut results = stream::iter(entries)
        .map(|entry| entry.fetch(store))
        .buffered(store.concurrency().max(1));

    let mut done = 0;
    while let Some(result) = results.next().await {
        result?;
        done += 1;
        progress.update(fraction(done, total));
    }

    Ok(())
}

/// SHA-1 of a file on disk, `None` if it does not exist.
pub async fn file_sha1(path: &Path) -> LauncherResult<Option<String>> {
    let mut file = match tokio::fs::File::open(path).await {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(LauncherError::io(path, e)),
    };

    let mut hasher = Sha1::new();
    let mut buf = vec![0u8; 64 * 1024];
    loop {
        let read = file
            .read(&mut buf)
            .await
            .map_err(|e| LauncherError::io(path, e))?;
        if read == 0 {
            break;
        }
        hasher.update(&buf[..read]);
    }

    Ok(Some(hex::encode(hasher.finalize())))
}

/// Lowercase hex SHA-1 of an in-memory buffer.
pub fn sha1_hex(bytes: &[u8]) -> String {
    hex::encode(Sha1::digest(bytes))
}

fn matches_any(actual: &str, hashes: &[&str]) -> bool {
    hashes
        .iter()
        .any(|expected| expected.trim().eq_ignore_ascii_case(actual))
}
