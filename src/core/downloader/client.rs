use std::path::Path;

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::Client;
use sha1::{Digest, Sha1};
use tokio::io::AsyncWriteExt;
use tracing::debug;

use super::{ArtifactStore, DEFAULT_CONCURRENCY};
use crate::core::error::{LauncherError, LauncherResult};
use crate::core::http::build_http_client;

/// HTTP-backed artifact store with SHA-1 validation.
pub struct Downloader {
    client: Client,
    /// Maximum number of parallel downloads.
    concurrency: usize,
}

impl Downloader {
    pub fn new() -> LauncherResult<Self> {
        Ok(Self::with_client(build_http_client()?))
    }

    pub fn with_client(client: Client) -> Self {
        Self {
            client,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }

    pub fn with_concurrency(mut self, n: usize) -> Self {
        self.concurrency = n.max(1);
        self
    }

    /// Stream the response body to `dest`, hashing as it goes.
    async fn stream_to_file(&self, url: &str, dest: &Path) -> LauncherResult<String> {
        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| LauncherError::io(parent, e))?;
        }

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(LauncherError::RequestFailed {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let mut hasher = Sha1::new();
        let mut written = 0u64;

        // Scoped so the handle is closed before the caller re-reads the file.
        {
            let mut file = tokio::fs::File::create(dest)
                .await
                .map_err(|e| LauncherError::io(dest, e))?;
            let mut body = response.bytes_stream();
            while let Some(chunk) = body.next().await {
                let chunk = chunk?;
                hasher.update(&chunk);
                written += chunk.len() as u64;
                file.write_all(&chunk)
                    .await
                    .map_err(|e| LauncherError::io(dest, e))?;
            }
            file.flush().await.map_err(|e| LauncherError::io(dest, e))?;
        }

        debug!("Downloaded: {} -> {:?} ({} bytes)", url, dest, written);
        Ok(hex::encode(hasher.finalize()))
    }
}

#[async_trait]
impl ArtifactStore for Downloader {
    async fn fetch_bytes(&self, url: &str) -> LauncherResult<Vec<u8>> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(LauncherError::RequestFailed {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(response.bytes().await?.to_vec())
    }

    async fn download_to(&self, url: &str, dest: &Path) -> LauncherResult<String> {
        self.stream_to_file(url, dest)
            .await
            .map_err(|e| LauncherError::DownloadFailed {
                url: url.to_string(),
                dest: dest.to_path_buf(),
                reason: e.to_string(),
            })
    }

    fn concurrency(&self) -> usize {
        self.concurrency
    }
}
