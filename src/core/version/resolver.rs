// ─── Version Resolver ───
// Game version ids and Forge selectors to concrete manifest references.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, info, warn};

use super::manifest::{VersionManifest, VERSION_MANIFEST_URL};
use super::version_file::{VersionJson, VersionType};
use crate::core::downloader::ArtifactStore;
use crate::core::error::{parse_manifest, LauncherError, LauncherResult};
use crate::core::maven::{FORGE_MAVEN, FORGE_PROMOTIONS};

/// A resolved base game version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameVersion {
    pub id: String,
    pub version_type: VersionType,
    pub url: String,
    pub sha1: Option<String>,
}

impl GameVersion {
    /// `versions/<id>/<id>.json`
    pub fn json_path(&self, game_dir: &Path) -> PathBuf {
        self.version_dir(game_dir).join(format!("{}.json", self.id))
    }

    /// `versions/<id>/<id>.jar`
    pub fn jar_path(&self, game_dir: &Path) -> PathBuf {
        self.version_dir(game_dir).join(format!("{}.jar", self.id))
    }

    fn version_dir(&self, game_dir: &Path) -> PathBuf {
        game_dir.join("versions").join(&self.id)
    }

    /// Fetch (or reuse) the per-version JSON under the game directory.
    pub async fn load_manifest(
        &self,
        store: &dyn ArtifactStore,
        game_dir: &Path,
    ) -> LauncherResult<VersionJson> {
        let dest = self.json_path(game_dir);
        match &self.sha1 {
            Some(sha1) => store.check_or_download(&self.url, sha1, &dest).await?,
            None => store.exists_or_download(&self.url, &dest).await?,
        }

        let bytes = tokio::fs::read(&dest)
            .await
            .map_err(|e| LauncherError::io(&dest, e))?;
        VersionJson::parse(&bytes, &self.id)
    }
}

/// Which Forge build to install on top of a game version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoaderSelector {
    Latest,
    Recommended,
    /// An explicit build string such as `14.23.4.2709`.
    Build(String),
}

impl From<&str> for LoaderSelector {
    fn from(value: &str) -> Self {
        match value {
            "latest" => LoaderSelector::Latest,
            "recommended" => LoaderSelector::Recommended,
            other => LoaderSelector::Build(other.to_string()),
        }
    }
}

/// A resolved Forge build for a specific game version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoaderVersion {
    pub mc_version: String,
    /// Full build string, e.g. `14.23.4.2709`.
    pub version: String,
    /// Numeric build id, the last component of `version`.
    pub build: u32,
    pub installer_url: String,
    pub universal_url: String,
}

impl LoaderVersion {
    pub fn new(mc_version: &str, version: &str, build: u32) -> Self {
        let base = format!(
            "{}/net/minecraftforge/forge/{mc}-{v}/forge-{mc}-{v}",
            FORGE_MAVEN,
            mc = mc_version,
            v = version
        );
        Self {
            mc_version: mc_version.to_string(),
            version: version.to_string(),
            build,
            installer_url: format!("{}-installer.jar", base),
            universal_url: format!("{}-universal.jar", base),
        }
    }

    /// Maven coordinate of the universal jar.
    pub fn universal_coordinate(&self) -> String {
        format!(
            "net.minecraftforge:forge:{}-{}:universal",
            self.mc_version, self.version
        )
    }

    /// `versions/<mc>/<mc>-loader.json`
    pub fn profile_cache_path(&self, game_dir: &Path) -> PathBuf {
        game_dir
            .join("versions")
            .join(&self.mc_version)
            .join(format!("{}-loader.json", self.mc_version))
    }
}

/// Numeric build id of a dotted build string: the last component.
///
/// Strings without any `.` are not build strings and yield `None`.
pub fn parse_build_id(version: &str) -> Option<u32> {
    if !version.contains('.') {
        return None;
    }
    version.rsplit('.').next()?.trim().parse().ok()
}

#[derive(Debug, Deserialize)]
struct Promotions {
    promos: HashMap<String, String>,
}

/// Resolves version identifiers against the remote indexes.
pub struct VersionResolver<'a> {
    store: &'a dyn ArtifactStore,
    manifest_url: String,
    promotions_url: String,
}

impl<'a> VersionResolver<'a> {
    pub fn new(store: &'a dyn ArtifactStore) -> Self {
        Self {
            store,
            manifest_url: VERSION_MANIFEST_URL.to_string(),
            promotions_url: FORGE_PROMOTIONS.to_string(),
        }
    }

    pub fn with_endpoints(mut self, manifest_url: &str, promotions_url: &str) -> Self {
        self.manifest_url = manifest_url.to_string();
        self.promotions_url = promotions_url.to_string();
        self
    }

    /// Look up a game version. Unknown ids resolve to `None`.
    pub async fn resolve_game(&self, id: &str) -> LauncherResult<Option<GameVersion>> {
        let manifest = VersionManifest::fetch_from(self.store, &self.manifest_url).await?;
        let Some(entry) = manifest.find_version(id) else {
            warn!("Version {} not found in manifest", id);
            return Ok(None);
        };

        debug!("Resolved {} -> {} ({})", id, entry.id, entry.version_type);
        Ok(Some(GameVersion {
            id: entry.id.clone(),
            version_type: entry.version_type,
            url: entry.url.clone(),
            sha1: entry.sha1.clone(),
        }))
    }

    /// Resolve a Forge selector for `game`.
    ///
    /// Explicit builds need no network access; promotion labels consult
    /// the promotion index. Unparseable or unpromoted builds yield `None`.
    pub async fn resolve_loader(
        &self,
        game: &GameVersion,
        selector: &LoaderSelector,
    ) -> LauncherResult<Option<LoaderVersion>> {
        let version = match selector {
            LoaderSelector::Build(version) => Some(version.clone()),
            LoaderSelector::Latest => self.promoted(&game.id, "latest").await?,
            LoaderSelector::Recommended => self.promoted(&game.id, "recommended").await?,
        };
        let Some(version) = version else {
            return Ok(None);
        };

        let Some(build) = parse_build_id(&version) else {
            warn!("Unresolvable Forge build string {:?}", version);
            return Ok(None);
        };

        info!("Resolved Forge {} (build {}) for {}", version, build, game.id);
        Ok(Some(LoaderVersion::new(&game.id, &version, build)))
    }

    async fn promoted(&self, mc_version: &str, label: &str) -> LauncherResult<Option<String>> {
        let bytes = self.store.fetch_bytes(&self.promotions_url).await?;
        let promotions: Promotions = parse_manifest(&bytes, &self.promotions_url)?;
        let promoted = promotions
            .promos
            .get(&format!("{}-{}", mc_version, label))
            .cloned();
        if promoted.is_none() {
            warn!("No {} Forge build promoted for {}", label, mc_version);
        }
        Ok(promoted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::downloader::fake::FakeStore;
    use crate::core::version::manifest::tests::INDEX;

    const PROMOS: &str = r#"{
        "homepage": "https://files.minecraftforge.net/",
        "promos": {
            "1.12.2-latest": "14.23.5.2860",
            "1.12.2-recommended": "14.23.5.2859"
        }
    }"#;

    fn store() -> FakeStore {
        FakeStore::new()
            .with_file(VERSION_MANIFEST_URL, INDEX.as_bytes())
            .with_file(FORGE_PROMOTIONS, PROMOS.as_bytes())
    }

    fn game(id: &str) -> GameVersion {
        GameVersion {
            id: id.to_string(),
            version_type: VersionType::Release,
            url: format!("https://meta/{id}.json"),
            sha1: None,
        }
    }

    #[test]
    fn build_id_is_last_component() {
        assert_eq!(parse_build_id("14.23.4.2709"), Some(2709));
        assert_eq!(parse_build_id("notaversion"), None);
        assert_eq!(parse_build_id("1.x"), None);
    }

    #[test]
    fn selector_from_str() {
        assert_eq!(LoaderSelector::from("latest"), LoaderSelector::Latest);
        assert_eq!(
            LoaderSelector::from("14.23.4.2709"),
            LoaderSelector::Build("14.23.4.2709".into())
        );
    }

    #[tokio::test]
    async fn resolves_game_versions_and_aliases() {
        let store = store();
        let resolver = VersionResolver::new(&store);

        let v = resolver.resolve_game("latest-release").await.unwrap().unwrap();
        assert_eq!(v.id, "1.20.4");
        assert_eq!(v.url, "https://meta/1.20.4.json");

        assert!(resolver.resolve_game("0.0.0").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn explicit_build_needs_no_network() {
        let store = FakeStore::new();
        let resolver = VersionResolver::new(&store);

        let forge = resolver
            .resolve_loader(&game("1.12.2"), &"14.23.4.2709".into())
            .await
            .unwrap()
            .unwrap();

        assert_eq!(forge.build, 2709);
        assert_eq!(
            forge.installer_url,
            "https://maven.minecraftforge.net/net/minecraftforge/forge/1.12.2-14.23.4.2709/forge-1.12.2-14.23.4.2709-installer.jar"
        );
        assert!(store.requested().is_empty());
    }

    #[tokio::test]
    async fn unparseable_build_is_unresolved() {
        let store = FakeStore::new();
        let resolver = VersionResolver::new(&store);
        let forge = resolver
            .resolve_loader(&game("1.12.2"), &"notaversion".into())
            .await
            .unwrap();
        assert!(forge.is_none());
    }

    #[tokio::test]
    async fn promoted_builds_come_from_promotion_index() {
        let store = store();
        let resolver = VersionResolver::new(&store);

        let recommended = resolver
            .resolve_loader(&game("1.12.2"), &LoaderSelector::Recommended)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(recommended.version, "14.23.5.2859");
        assert_eq!(recommended.build, 2859);

        let missing = resolver
            .resolve_loader(&game("1.20.4"), &LoaderSelector::Latest)
            .await
            .unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn version_json_is_cached_under_versions() {
        let dir = tempfile::tempdir().unwrap();
        let store = FakeStore::new().with_file(
            "https://meta/1.20.4.json",
            br#"{"id": "1.20.4", "mainClass": "net.minecraft.client.main.Main",
                 "arguments": {"game": [], "jvm": []}}"#,
        );

        let v = game("1.20.4");
        let json = v.load_manifest(&store, dir.path()).await.unwrap();
        assert_eq!(json.main_class, "net.minecraft.client.main.Main");
        assert!(dir.path().join("versions/1.20.4/1.20.4.json").exists());

        v.load_manifest(&store, dir.path()).await.unwrap();
        assert_eq!(store.download_count(), 1);
    }
}
