use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::info;

use crate::core::downloader::{download_batch, ArtifactStore, DownloadEntry};
use crate::core::error::{parse_manifest, LauncherError, LauncherResult};
use crate::core::progress::Progress;
use crate::core::version::version_file::AssetIndexInfo;

pub const RESOURCES_URL: &str = "https://resources.download.minecraft.net";

/// Top-level asset index JSON structure.
#[derive(Debug, Deserialize)]
pub struct AssetIndex {
    pub objects: BTreeMap<String, AssetObject>,
}

#[derive(Debug, Deserialize)]
pub struct AssetObject {
    pub hash: String,
    pub size: u64,
}

impl AssetObject {
    /// `<hh>/<hash>`, shared by the CDN and the local object store.
    pub fn relative_path(&self) -> String {
        let prefix = self.hash.get(..2).unwrap_or(&self.hash);
        format!("{}/{}", prefix, self.hash)
    }
}

/// Installs the asset index and every object it references under
/// `<game_dir>/assets`.
pub struct AssetManager {
    assets_dir: PathBuf,
    resources_url: String,
}

impl AssetManager {
    pub fn new(game_dir: &Path) -> Self {
        Self {
            assets_dir: game_dir.join("assets"),
            resources_url: RESOURCES_URL.to_string(),
        }
    }

    pub fn with_resources_url(mut self, url: &str) -> Self {
        self.resources_url = url.trim_end_matches('/').to_string();
        self
    }

    pub fn index_path(&self, id: &str) -> PathBuf {
        self.assets_dir.join("indexes").join(format!("{}.json", id))
    }

    /// Download-or-verify `indexes/<id>.json`, then every object into
    /// `objects/<hh>/<hash>`. Progress is reported per object.
    pub async fn install(
        &self,
        store: &dyn ArtifactStore,
        id: &str,
        info: &AssetIndexInfo,
        progress: &dyn Progress,
    ) -> LauncherResult<()> {
        let index_path = self.index_path(id);
        match &info.sha1 {
            Some(sha1) => store.check_or_download(&info.url, sha1, &index_path).await?,
            None => store.exists_or_download(&info.url, &index_path).await?,
        }

        let raw = tokio::fs::read(&index_path)
            .await
            .map_err(|e| LauncherError::io(&index_path, e))?;
        let index: AssetIndex = parse_manifest(&raw, &info.url)?;

        let objects_dir = self.assets_dir.join("objects");
        let entries: Vec<DownloadEntry> = index
            .objects
            .values()
            .map(|obj| {
                let relative = obj.relative_path();
                DownloadEntry::new(
                    format!("{}/{}", self.resources_url, relative),
                    objects_dir.join(&relative),
                    Some(obj.hash.clone()),
                )
            })
            .collect();

        info!("Verifying {} asset objects for index {}", entries.len(), id);
        download_batch(store, &entries, progress).await?;
        progress.update(1.0);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::downloader::fake::FakeStore;
    use crate::core::downloader::sha1_hex;
    use crate::core::progress::recording::RecordingProgress;

    #[tokio::test]
    async fn installs_index_and_objects() {
        let dir = tempfile::tempdir().unwrap();
        let sound = sha1_hex(b"sound");
        let texture = sha1_hex(b"texture");
        let index = serde_json::json!({"objects": {
            "minecraft/sounds/a.ogg": {"hash": sound, "size": 5},
            "minecraft/textures/b.png": {"hash": texture, "size": 7}
        }})
        .to_string();

        let store = FakeStore::new()
            .with_file("https://meta/indexes/1.12.json", index.as_bytes())
            .with_file(&format!("{}/{}/{}", RESOURCES_URL, &sound[..2], sound), b"sound")
            .with_file(&format!("{}/{}/{}", RESOURCES_URL, &texture[..2], texture), b"texture");
        let info = AssetIndexInfo {
            id: "1.12".into(),
            url: "https://meta/indexes/1.12.json".into(),
            sha1: Some(sha1_hex(index.as_bytes())),
            total_size: None,
        };

        let manager = AssetManager::new(dir.path());
        let progress = RecordingProgress::default();
        manager.install(&store, "1.12", &info, &progress).await.unwrap();

        let assets = dir.path().join("assets");
        assert!(assets.join("indexes/1.12.json").exists());
        assert!(assets.join("objects").join(&sound[..2]).join(&sound).exists());
        assert_eq!(progress.last_update(), Some(1.0));

        manager.install(&store, "1.12", &info, &progress).await.unwrap();
        assert_eq!(store.download_count(), 3);
    }
}
