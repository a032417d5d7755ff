// ─── Minecraft Client ───
// One resolved version (optionally with Forge) bound to a game directory:
// install, reconcile mods, bookmark servers, launch.

use std::sync::Arc;

use tracing::{info, warn};

use crate::core::assets::AssetManager;
use crate::core::auth::AuthenticationResult;
use crate::core::config::{ClientOptions, LaunchOptions, ServerAddress};
use crate::core::downloader::ArtifactStore;
use crate::core::error::LauncherResult;
use crate::core::launch::{build_launch_arguments, spawn_game, LaunchedGame};
use crate::core::loaders::LibraryManager;
use crate::core::mods::{reconcile, ModDescriptor};
use crate::core::progress::Progress;
use crate::core::servers::ServersDat;
use crate::core::version::{GameVersion, LoaderSelector, LoaderVersion, VersionResolver};

pub struct MinecraftClient {
    store: Arc<dyn ArtifactStore>,
    progress: Arc<dyn Progress>,
    options: ClientOptions,
    loader: Option<LoaderVersion>,
    libraries: LibraryManager,
}

impl MinecraftClient {
    /// Resolve `version` (and `loader`, if given) and bind them to `options`.
    ///
    /// Unknown versions and unresolvable loader builds yield `None`.
    pub async fn get_client(
        store: Arc<dyn ArtifactStore>,
        version: &str,
        loader: Option<&str>,
        options: ClientOptions,
        progress: Arc<dyn Progress>,
    ) -> LauncherResult<Option<Self>> {
        let resolver = VersionResolver::new(store.as_ref());

        let Some(game) = resolver.resolve_game(version).await? else {
            return Ok(None);
        };

        let loader = match loader {
            Some(selector) => {
                match resolver
                    .resolve_loader(&game, &LoaderSelector::from(selector))
                    .await?
                {
                    Some(loader) => Some(loader),
                    None => return Ok(None),
                }
            }
            None => None,
        };

        Self::new(store, game, loader, options, progress).map(Some)
    }

    pub fn new(
        store: Arc<dyn ArtifactStore>,
        version: GameVersion,
        loader: Option<LoaderVersion>,
        options: ClientOptions,
        progress: Arc<dyn Progress>,
    ) -> LauncherResult<Self> {
        let libraries = LibraryManager::new(&options.game_dir, version, options.rule_context())?;
        Ok(Self {
            store,
            progress,
            options,
            loader,
            libraries,
        })
    }

    pub fn version(&self) -> &GameVersion {
        self.libraries.version()
    }

    pub fn loader(&self) -> Option<&LoaderVersion> {
        self.loader.as_ref()
    }

    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    pub fn libraries(&self) -> &LibraryManager {
        &self.libraries
    }

    /// Libraries, then loader libraries, then assets.
    pub async fn check_installation(&mut self) -> LauncherResult<()> {
        let store = self.store.as_ref();
        let progress = self.progress.as_ref();

        progress.step("Installing Libraries");
        self.libraries.install_game_libraries(store, progress).await?;

        if let Some(loader) = &self.loader {
            progress.step("Installing Forge Libraries");
            self.libraries
                .install_loader_libraries(store, loader, progress)
                .await?;
        }

        progress.step("Installing Assets");
        let manifest = self
            .libraries
            .version()
            .load_manifest(store, self.libraries.game_dir())
            .await?;
        match &manifest.asset_index {
            Some(index) => {
                AssetManager::new(self.libraries.game_dir())
                    .install(store, &manifest.asset_index_id(), index, progress)
                    .await?
            }
            None => warn!("{} declares no asset index", manifest.id),
        }

        info!("Installation of {} verified", self.version().id);
        Ok(())
    }

    pub async fn check_mods(&self, mods: &[ModDescriptor], exclusive: bool) -> LauncherResult<()> {
        self.progress.step("Installing Mods");
        reconcile(
            self.store.as_ref(),
            &self.libraries.game_dir().join("mods"),
            mods,
            exclusive,
            self.progress.as_ref(),
        )
        .await
    }

    /// Add `server` to the game's server list. Returns whether it was new.
    pub async fn ensure_servers_dat(&self, server: &ServerAddress) -> LauncherResult<bool> {
        ServersDat::new(self.libraries.game_dir().join("servers.dat"))
            .ensure_server(server)
            .await
    }

    /// Unpack natives, build the command line and spawn the game.
    pub async fn launch(
        &self,
        auth: &AuthenticationResult,
        launch_options: &LaunchOptions,
    ) -> LauncherResult<LaunchedGame> {
        let natives = self.libraries.unpack_natives(self.store.as_ref()).await?;
        let args = build_launch_arguments(&self.libraries, natives.path(), auth, launch_options)?;
        let child = spawn_game(
            &self.options.java_executable,
            self.libraries.game_dir(),
            &args,
            launch_options.redirect_output,
        )?;
        Ok(LaunchedGame::new(child, natives))
    }
}
