use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::installer::LibraryManager;
use crate::core::downloader::{download_batch, ArtifactStore, DownloadEntry};
use crate::core::error::{LauncherError, LauncherResult};
use crate::core::progress::Progress;
use crate::core::version::{RuleContext, VersionJson};

/// Downloads and classpath entries derived from a version JSON, in
/// manifest order.
#[derive(Debug, Default)]
pub(crate) struct GameLibraryPlan {
    pub classpath: Vec<PathBuf>,
    pub downloads: Vec<DownloadEntry>,
}

/// Walk the library list once, selecting what this platform needs.
///
/// Classpath order comes from this walk, never from download completion.
pub(crate) fn plan_game_libraries(
    manifest: &VersionJson,
    libraries_dir: &Path,
    client_jar: &Path,
    ctx: &RuleContext,
) -> LauncherResult<GameLibraryPlan> {
    let mut plan = GameLibraryPlan::default();

    for lib in &manifest.libraries {
        if !lib.is_allowed(ctx) {
            debug!("Skipping {} (rules)", lib.name);
            continue;
        }

        if let Some(artifact) = lib.classpath_artifact() {
            let dest = libraries_dir.join(&artifact.path);
            plan.classpath.push(dest.clone());
            plan.downloads
                .push(DownloadEntry::new(&artifact.url, dest, Some(artifact.sha1.clone())));
        }

        if let Some(native) = lib.native_artifact(ctx.os) {
            plan.downloads.push(DownloadEntry::new(
                &native.url,
                libraries_dir.join(&native.path),
                Some(native.sha1.clone()),
            ));
        }
    }

    let client = manifest
        .downloads
        .as_ref()
        .map(|d| &d.client)
        .ok_or_else(|| LauncherError::ManifestParse {
            origin: manifest.id.clone(),
            reason: "missing downloads.client".into(),
        })?;
    plan.classpath.push(client_jar.to_path_buf());
    plan.downloads.push(DownloadEntry::new(
        &client.url,
        client_jar,
        Some(client.sha1.clone()),
    ));

    Ok(plan)
}

impl LibraryManager {
    /// Install the base game's libraries, natives and client jar, then
    /// record its main class, asset index, version type and arguments.
    pub async fn install_game_libraries(
        &mut self,
        store: &dyn ArtifactStore,
        progress: &dyn Progress,
    ) -> LauncherResult<()> {
        info!("Installing libraries for {}", self.version.id);

        let manifest = self.version.load_manifest(store, &self.game_dir).await?;
        let arguments = manifest.launch_arguments()?;
        let client_jar = self.version.jar_path(&self.game_dir);
        let plan = plan_game_libraries(&manifest, &self.libraries_dir(), &client_jar, &self.rules)?;

        self.state.classpath.extend(plan.classpath);
        download_batch(store, &plan.downloads, progress).await?;
        progress.update(1.0);

        self.state.main_class = manifest.main_class.clone();
        self.state.version_type = manifest.version_type;
        self.state.asset_index_id = manifest.asset_index_id();
        self.state.arguments = arguments;

        info!(
            "{} libraries verified for {}",
            plan.downloads.len(),
            self.version.id
        );
        Ok(())
    }
}
