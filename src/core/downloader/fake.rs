//! In-memory [`ArtifactStore`] for tests.

use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use super::{sha1_hex, ArtifactStore};
use crate::core::error::{LauncherError, LauncherResult};

#[derive(Default)]
pub struct FakeStore {
    files: Mutex<HashMap<String, Vec<u8>>>,
    downloads: AtomicUsize,
    fetches: AtomicUsize,
    requested: Mutex<Vec<String>>,
    delays: Mutex<HashMap<String, Duration>>,
    completed: Mutex<Vec<String>>,
}

impl FakeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(self, url: &str, bytes: &[u8]) -> Self {
        self.insert(url, bytes);
        self
    }

    pub fn insert(&self, url: &str, bytes: &[u8]) {
        self.files
            .lock()
            .unwrap()
            .insert(url.to_string(), bytes.to_vec());
    }

    /// Hold `download_to` for `url` back by `delay` before writing.
    pub fn with_delay(self, url: &str, delay: Duration) -> Self {
        self.delays
            .lock()
            .unwrap()
            .insert(url.to_string(), delay);
        self
    }

    /// URLs whose `download_to` finished, in completion order.
    pub fn completed(&self) -> Vec<String> {
        self.completed.lock().unwrap().clone()
    }

    /// Number of `download_to` calls that wrote a file.
    pub fn download_count(&self) -> usize {
        self.downloads.load(Ordering::SeqCst)
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    /// Every URL asked for, in order, successful or not.
    pub fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }

    fn lookup(&self, url: &str) -> Option<Vec<u8>> {
        self.requested.lock().unwrap().push(url.to_string());
        self.files.lock().unwrap().get(url).cloned()
    }
}

#[async_trait]
impl ArtifactStore for FakeStore {
    async fn fetch_bytes(&self, url: &str) -> LauncherResult<Vec<u8>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.lookup(url).ok_or_else(|| LauncherError::RequestFailed {
            url: url.to_string(),
            status: 404,
        })
    }

    async fn download_to(&self, url: &str, dest: &Path) -> LauncherResult<String> {
        let bytes = self
            .lookup(url)
            .ok_or_else(|| LauncherError::DownloadFailed {
                url: url.to_string(),
                dest: dest.to_path_buf(),
                reason: "HTTP 404".into(),
            })?;
        let delay = self.delays.lock().unwrap().get(url).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| LauncherError::io(parent, e))?;
        }
        tokio::fs::write(dest, &bytes)
            .await
            .map_err(|e| LauncherError::io(dest, e))?;
        self.downloads.fetch_add(1, Ordering::SeqCst);
        self.completed.lock().unwrap().push(url.to_string());
        Ok(sha1_hex(&bytes))
    }
}
