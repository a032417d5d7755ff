// ─── Version Manifest ───
// Handles fetching and parsing the Mojang version manifest v2.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::info;

use super::version_file::VersionType;
use crate::core::downloader::ArtifactStore;
use crate::core::error::{parse_manifest, LauncherResult};

pub const VERSION_MANIFEST_URL: &str =
    "https://piston-meta.mojang.com/mc/game/version_manifest_v2.json";

/// Top-level Mojang version manifest.
#[derive(Debug, Clone, Deserialize)]
pub struct VersionManifest {
    pub latest: LatestVersions,
    pub versions: Vec<VersionEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LatestVersions {
    pub release: String,
    pub snapshot: String,
}

/// A single entry in the manifest.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionEntry {
    pub id: String,
    #[serde(rename = "type", default)]
    pub version_type: VersionType,
    pub url: String,
    pub release_time: DateTime<Utc>,
    #[serde(default)]
    pub sha1: Option<String>,
}

impl VersionManifest {
    pub async fn fetch(store: &dyn ArtifactStore) -> LauncherResult<Self> {
        Self::fetch_from(store, VERSION_MANIFEST_URL).await
    }

    pub async fn fetch_from(store: &dyn ArtifactStore, url: &str) -> LauncherResult<Self> {
        info!("Fetching Minecraft version manifest...");
        let bytes = store.fetch_bytes(url).await?;
        let manifest: VersionManifest = parse_manifest(&bytes, url)?;
        info!("Loaded {} versions from manifest", manifest.versions.len());
        Ok(manifest)
    }

    /// Find a version entry by ID (e.g. "1.20.4"). `latest-release` and
    /// `latest-snapshot` follow the `latest` block.
    pub fn find_version(&self, id: &str) -> Option<&VersionEntry> {
        let id = match id {
            "latest-release" => self.latest.release.as_str(),
            "latest-snapshot" => self.latest.snapshot.as_str(),
            other => other,
        };
        self.versions.iter().find(|v| v.id == id)
    }

    pub fn releases(&self) -> impl Iterator<Item = &VersionEntry> {
        self.versions
            .iter()
            .filter(|v| v.version_type == VersionType::Release)
    }
}
