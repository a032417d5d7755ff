use std::io::Read;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, info, warn};

use super::installer::LibraryManager;
use crate::core::downloader::ArtifactStore;
use crate::core::error::{parse_manifest, LauncherError, LauncherResult};
use crate::core::maven::{MavenArtifact, MAVEN_CENTRAL, MOJANG_LIBRARIES};
use crate::core::progress::{fraction, Progress};
use crate::core::version::version_file::split_legacy;
use crate::core::version::{Arguments, LoaderVersion, VersionType};

const INSTALL_PROFILE: &str = "install_profile.json";

/// Subset of Forge's `install_profile.json` (legacy installer layout).
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForgeInstallProfile {
    pub version_info: ForgeVersionInfo,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForgeVersionInfo {
    pub main_class: String,
    #[serde(default)]
    pub arguments: Option<Arguments>,
    #[serde(default)]
    pub minecraft_arguments: Option<String>,
    #[serde(default)]
    pub libraries: Vec<ForgeLibrary>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ForgeLibrary {
    pub name: String,
    /// Repository base; Mojang's library host when absent.
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub checksums: Vec<String>,
    #[serde(default)]
    pub clientreq: Option<bool>,
    #[serde(default)]
    pub serverreq: Option<bool>,
}

impl ForgeLibrary {
    /// Only entries explicitly marked `clientreq: false` are server-side.
    pub fn is_client(&self) -> bool {
        self.clientreq != Some(false)
    }
}

/// Result of installing one optional loader library.
#[derive(Debug)]
pub enum LibraryOutcome {
    Installed(PathBuf),
    /// Both the primary host and the fallback mirror failed.
    SkippedOptional { url: String, error: LauncherError },
}

/// Try the library's own repository, then Maven Central, once each.
pub async fn install_with_fallback(
    store: &dyn ArtifactStore,
    lib: &ForgeLibrary,
    artifact: &MavenArtifact,
    dest: &Path,
) -> LibraryOutcome {
    let hashes: Vec<&str> = lib.checksums.iter().map(String::as_str).collect();

    let primary = artifact.url(lib.url.as_deref().unwrap_or(MOJANG_LIBRARIES));
    match store.check_or_download_any(&primary, &hashes, dest).await {
        Ok(()) => return LibraryOutcome::Installed(dest.to_path_buf()),
        Err(e) => debug!("{} unavailable ({}), trying mirror", primary, e),
    }

    let fallback = artifact.url(MAVEN_CENTRAL);
    match store.check_or_download_any(&fallback, &hashes, dest).await {
        Ok(()) => LibraryOutcome::Installed(dest.to_path_buf()),
        Err(error) => LibraryOutcome::SkippedOptional {
            url: fallback,
            error,
        },
    }
}

/// Pull `install_profile.json` out of an installer archive held in memory.
fn extract_install_profile(installer: &[u8], origin: &str) -> LauncherResult<Vec<u8>> {
    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(installer))?;
    let mut entry = archive
        .by_name(INSTALL_PROFILE)
        .map_err(|e| LauncherError::ManifestParse {
            origin: origin.to_string(),
            reason: format!("missing {}: {}", INSTALL_PROFILE, e),
        })?;

    let mut profile = Vec::with_capacity(entry.size() as usize);
    entry
        .read_to_end(&mut profile)
        .map_err(|e| LauncherError::ManifestParse {
            origin: origin.to_string(),
            reason: e.to_string(),
        })?;
    Ok(profile)
}

impl LibraryManager {
    /// Read the cached install profile, or fetch the installer and cache
    /// the profile it carries.
    async fn load_install_profile(
        &self,
        store: &dyn ArtifactStore,
        loader: &LoaderVersion,
    ) -> LauncherResult<ForgeInstallProfile> {
        let cache = loader.profile_cache_path(&self.game_dir);

        let bytes = if tokio::fs::try_exists(&cache)
            .await
            .map_err(|e| LauncherError::io(&cache, e))?
        {
            debug!("Using cached install profile {:?}", cache);
            tokio::fs::read(&cache)
                .await
                .map_err(|e| LauncherError::io(&cache, e))?
        } else {
            info!("Fetching Forge installer {}", loader.installer_url);
            let installer = store.fetch_bytes(&loader.installer_url).await?;
            let profile = extract_install_profile(&installer, &loader.installer_url)?;

            if let Some(parent) = cache.parent() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|e| LauncherError::io(parent, e))?;
            }
            tokio::fs::write(&cache, &profile)
                .await
                .map_err(|e| LauncherError::io(&cache, e))?;
            profile
        };

        parse_manifest(&bytes, &cache.to_string_lossy())
    }

    /// Overlay a Forge build: its client libraries, its universal jar, and
    /// its main class and arguments.
    ///
    /// Every client library path is appended to the classpath before it is
    /// fetched, including optional ones that end up skipped.
    pub async fn install_loader_libraries(
        &mut self,
        store: &dyn ArtifactStore,
        loader: &LoaderVersion,
        progress: &dyn Progress,
    ) -> LauncherResult<()> {
        info!("Installing Forge {} for {}", loader.version, loader.mc_version);

        let profile = self.load_install_profile(store, loader).await?.version_info;
        let libraries: Vec<&ForgeLibrary> =
            profile.libraries.iter().filter(|lib| lib.is_client()).collect();
        let libs_dir = self.libraries_dir();

        for (i, lib) in libraries.iter().enumerate() {
            progress.update(fraction(i, libraries.len()));

            let artifact = MavenArtifact::parse(&lib.name)?;
            let dest = libs_dir.join(artifact.local_path());
            self.state.classpath.push(dest.clone());
            match install_with_fallback(store, lib, &artifact, &dest).await {
                LibraryOutcome::Installed(path) => debug!("Loader library ready: {:?}", path),
                LibraryOutcome::SkippedOptional { url, error } => {
                    warn!("Skipping optional library {} ({}): {}", lib.name, url, error)
                }
            }
        }

        let sha1_url = format!("{}.sha1", loader.universal_url);
        let sha1 = String::from_utf8_lossy(&store.fetch_bytes(&sha1_url).await?)
            .trim()
            .to_string();
        let universal = libs_dir.join(MavenArtifact::parse(&loader.universal_coordinate())?.local_path());
        self.state.classpath.push(universal.clone());
        store
            .check_or_download(&loader.universal_url, &sha1, &universal)
            .await?;
        progress.update(1.0);

        self.state.main_class = profile.main_class;
        match (profile.arguments, profile.minecraft_arguments) {
            (Some(arguments), _) => self.state.arguments = arguments,
            (None, Some(legacy)) => self.state.arguments.game = split_legacy(&legacy),
            (None, None) => {}
        }
        self.state.version_type = VersionType::Ignored;

        info!("Forge {} installed", loader.version);
        Ok(())
    }
}
