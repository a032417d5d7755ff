// ─── Launch Task ───
// Builds the final command line and spawns the game process.

use std::path::Path;
use std::process::{ExitStatus, Stdio};

use tokio::process::{Child, Command};
use tracing::{debug, info, warn};

use super::arguments::{resolve_game_arguments, resolve_jvm_arguments, SubstitutionTable};
use super::classpath::{classpath_separator, NativesDir};
use crate::core::auth::AuthenticationResult;
use crate::core::config::LaunchOptions;
use crate::core::error::{LauncherError, LauncherResult};
use crate::core::http::{LAUNCHER_NAME, LAUNCHER_VERSION};
use crate::core::loaders::LibraryManager;

fn path_str(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

fn jvm_table(manager: &LibraryManager, natives_dir: &Path) -> SubstitutionTable {
    SubstitutionTable::new()
        .with("natives_directory", path_str(natives_dir))
        .with("launcher_name", LAUNCHER_NAME)
        .with("launcher_version", LAUNCHER_VERSION)
        .with("classpath", manager.classpath())
        .with("classpath_separator", classpath_separator())
        .with("library_directory", path_str(&manager.libraries_dir()))
}

fn game_table(
    manager: &LibraryManager,
    auth: &AuthenticationResult,
    options: &LaunchOptions,
) -> SubstitutionTable {
    let state = manager.state();
    let assets_root = path_str(&manager.game_dir().join("assets"));

    let mut table = SubstitutionTable::new()
        .with("auth_player_name", auth.name.as_str())
        .with("version_name", manager.version().id.as_str())
        .with("game_directory", path_str(manager.game_dir()))
        .with("assets_root", assets_root.as_str())
        .with("game_assets", assets_root.as_str())
        .with("assets_index_name", state.asset_index_id.as_str())
        .with("auth_uuid", auth.uuid.as_str())
        .with("auth_access_token", auth.token_or_null())
        .with("auth_session", auth.token_or_null())
        .with("auth_xuid", auth.xuid.as_str())
        .with("clientid", auth.client_id.as_str())
        .with("user_type", auth.user_type.as_str())
        .with("version_type", state.version_type.as_str())
        .with("user_properties", "{}");

    if let Some(resolution) = &options.resolution {
        table.insert("resolution_width", resolution.width.to_string());
        table.insert("resolution_height", resolution.height.to_string());
    }
    table
}

/// Full argument vector: JVM arguments, main class, game arguments.
pub fn build_launch_arguments(
    manager: &LibraryManager,
    natives_dir: &Path,
    auth: &AuthenticationResult,
    options: &LaunchOptions,
) -> LauncherResult<Vec<String>> {
    let state = manager.state();
    if state.main_class.is_empty() {
        return Err(LauncherError::Other(
            "Main class not set, install libraries before launching".into(),
        ));
    }

    let mut args = resolve_jvm_arguments(
        &state.arguments.jvm,
        manager.rules(),
        &jvm_table(manager, natives_dir),
        options,
    )?;
    args.push(state.main_class.clone());
    args.extend(resolve_game_arguments(
        &state.arguments.game,
        manager.rules(),
        &game_table(manager, auth, options),
        options,
    )?);
    Ok(args)
}

/// Spawn `java` in `game_dir`. Output is forwarded to ours when
/// `redirect_output` is set, otherwise left piped for the caller.
pub fn spawn_game(
    java: &Path,
    game_dir: &Path,
    args: &[String],
    redirect_output: bool,
) -> LauncherResult<Child> {
    let mut cmd = Command::new(java);
    cmd.args(args).current_dir(game_dir);

    if redirect_output {
        cmd.stdout(Stdio::inherit()).stderr(Stdio::inherit());
    } else {
        cmd.stdout(Stdio::piped()).stderr(Stdio::piped());
    }

    info!("Launching Minecraft with Java: {:?}", java);
    debug!("Command: {:?}", cmd);

    cmd.spawn().map_err(|source| LauncherError::Spawn {
        program: java.to_path_buf(),
        source,
    })
}

/// A running game and the natives directory it loads from.
///
/// The directory is removed by [`LaunchedGame::wait`]. Dropping the handle
/// while the game still runs leaves the directory on disk; dropping it after
/// the game exited removes it.
#[must_use = "dropping a running game leaves its natives directory behind"]
#[derive(Debug)]
pub struct LaunchedGame {
    child: Child,
    natives: Option<NativesDir>,
}

impl LaunchedGame {
    pub fn new(child: Child, natives: NativesDir) -> Self {
        Self {
            child,
            natives: Some(natives),
        }
    }

    pub fn id(&self) -> Option<u32> {
        self.child.id()
    }

    /// Access to the process, e.g. to take its piped output.
    pub fn child_mut(&mut self) -> &mut Child {
        &mut self.child
    }

    pub fn natives_dir(&self) -> Option<&Path> {
        self.natives.as_ref().map(NativesDir::path)
    }

    /// Wait for the game to exit, then remove the natives directory.
    pub async fn wait(mut self) -> LauncherResult<ExitStatus> {
        let status = self.child.wait().await?;
        info!("Game exited with {}", status);
        if let Some(natives) = self.natives.take() {
            natives.close()?;
        }
        Ok(status)
    }
}

impl Drop for LaunchedGame {
    fn drop(&mut self) {
        let Some(natives) = self.natives.take() else {
            return;
        };
        match self.child.try_wait() {
            Ok(Some(_)) => drop(natives),
            _ => {
                let path = natives.keep();
                warn!("Game still running, leaving natives at {:?}", path);
            }
        }
    }
}
