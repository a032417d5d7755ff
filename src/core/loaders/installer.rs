use std::path::{Path, PathBuf};

use crate::core::downloader::ArtifactStore;
use crate::core::error::{LauncherError, LauncherResult};
use crate::core::launch::classpath::{join_classpath, unpack_natives, NativesDir};
use crate::core::version::{Arguments, GameVersion, RuleContext, VersionType};

/// What an installation accumulates for the launch that follows it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstallationState {
    /// Absolute jar paths in manifest order. Not deduplicated.
    pub classpath: Vec<PathBuf>,
    pub main_class: String,
    pub asset_index_id: String,
    pub version_type: VersionType,
    pub arguments: Arguments,
}

/// Installs one game version (plus an optional Forge overlay) into a game
/// directory and records what is needed to launch it.
///
/// Created per (options, version) pair; only ever mutated by the flow that
/// owns it.
pub struct LibraryManager {
    pub(super) game_dir: PathBuf,
    pub(super) rules: RuleContext,
    pub(super) version: GameVersion,
    pub(super) state: InstallationState,
}

impl LibraryManager {
    pub fn new(game_dir: &Path, version: GameVersion, rules: RuleContext) -> LauncherResult<Self> {
        let game_dir = std::path::absolute(game_dir).map_err(|e| LauncherError::io(game_dir, e))?;
        Ok(Self {
            game_dir,
            rules,
            version,
            state: InstallationState::default(),
        })
    }

    pub fn game_dir(&self) -> &Path {
        &self.game_dir
    }

    pub fn version(&self) -> &GameVersion {
        &self.version
    }

    pub fn rules(&self) -> &RuleContext {
        &self.rules
    }

    pub fn state(&self) -> &InstallationState {
        &self.state
    }

    pub fn libraries_dir(&self) -> PathBuf {
        self.game_dir.join("libraries")
    }

    /// Classpath entries joined with the platform separator, in the order
    /// they were added.
    pub fn classpath(&self) -> String {
        join_classpath(&self.state.classpath)
    }

    /// Unpack every native archive for this platform into a fresh scratch
    /// directory. The directory is removed when the guard is dropped.
    pub async fn unpack_natives(&self, store: &dyn ArtifactStore) -> LauncherResult<NativesDir> {
        let manifest = self.version.load_manifest(store, &self.game_dir).await?;
        unpack_natives(store, &self.libraries_dir(), &manifest, &self.rules).await
    }
}
