// ─── Configuration ───
// Client-wide options (where to install, which runtime, feature flags)
// and per-launch overrides.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::error::{LauncherError, LauncherResult};
use crate::core::version::{FeatureSet, RuleContext};

const APP_DIR_NAME: &str = "InterfaceOficial";
pub const DEFAULT_SERVER_PORT: u16 = 25565;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientOptions {
    /// Root of the installation: `libraries/`, `versions/`, `assets/`, `mods/`.
    pub game_dir: PathBuf,
    /// Runtime executable; a bare name is resolved through `PATH`.
    pub java_executable: PathBuf,
    pub features: FeatureSet,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            game_dir: default_game_dir(),
            java_executable: PathBuf::from("java"),
            features: FeatureSet::new(),
        }
    }
}

impl ClientOptions {
    pub fn new(game_dir: impl Into<PathBuf>) -> Self {
        Self {
            game_dir: game_dir.into(),
            ..Self::default()
        }
    }

    /// Read options from a JSON file. Absent fields take their defaults and
    /// a missing file yields the defaults.
    pub fn load(path: &Path) -> LauncherResult<Self> {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No options file at {:?}, using defaults", path);
                return Ok(Self::default());
            }
            Err(e) => return Err(LauncherError::io(path, e)),
        };
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn save(&self, path: &Path) -> LauncherResult<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).map_err(|e| LauncherError::io(path, e))
    }

    /// Rule context for this platform and these feature flags.
    pub fn rule_context(&self) -> RuleContext {
        RuleContext::current(self.features.clone())
    }
}

fn default_game_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR_NAME)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

/// A server to join on start, or to bookmark in `servers.dat`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerAddress {
    pub host: String,
    #[serde(default)]
    pub port: Option<u16>,
    /// Display name in the server list.
    #[serde(default)]
    pub name: Option<String>,
}

impl ServerAddress {
    pub fn new(host: &str, port: Option<u16>) -> Self {
        Self {
            host: host.to_string(),
            port,
            name: None,
        }
    }

    /// `host[:port]`, as stored in the server list.
    pub fn address(&self) -> String {
        match self.port {
            Some(port) => format!("{}:{}", self.host, port),
            None => self.host.clone(),
        }
    }

    pub fn port_or_default(&self) -> u16 {
        self.port.unwrap_or(DEFAULT_SERVER_PORT)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LaunchOptions {
    /// Forward the game's stdout/stderr to ours.
    pub redirect_output: bool,
    /// Heap bound such as `2G`, applied to both `-Xmx` and `-Xms`.
    pub memory: Option<String>,
    pub resolution: Option<Resolution>,
    pub server: Option<ServerAddress>,
}
