// ─── Server List ───
// Reads and writes the game's uncompressed NBT `servers.dat`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use fastnbt::Value;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::core::config::ServerAddress;
use crate::core::error::{LauncherError, LauncherResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerEntry {
    /// `host[:port]`
    pub ip: String,
    pub name: String,
    /// Base64 PNG the game caches after a ping.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(
        rename = "acceptTextures",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub accept_textures: Option<i8>,
    /// Tags written by the game that this crate does not model
    /// (`hidden`, `preventsChatReports`, ...). Written back unchanged.
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

impl ServerEntry {
    pub fn new(ip: &str, name: &str) -> Self {
        Self {
            ip: ip.to_string(),
            name: name.to_string(),
            icon: None,
            accept_textures: None,
            extra: HashMap::new(),
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct ServersFile {
    #[serde(default)]
    servers: Vec<ServerEntry>,
}

/// Handle on a `servers.dat` file.
pub struct ServersDat {
    path: PathBuf,
}

impl ServersDat {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Entries in file order. A missing or unreadable file reads as empty.
    pub async fn load(&self) -> Vec<ServerEntry> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) => {
                debug!("No server list at {:?}: {}", self.path, e);
                return Vec::new();
            }
        };

        match fastnbt::from_bytes::<ServersFile>(&bytes) {
            Ok(file) => file.servers,
            Err(e) => {
                warn!("Ignoring unreadable server list {:?}: {}", self.path, e);
                Vec::new()
            }
        }
    }

    /// Overwrite the file with `servers`.
    pub async fn save(&self, servers: &[ServerEntry]) -> LauncherResult<()> {
        let bytes = fastnbt::to_bytes(&ServersFile {
            servers: servers.to_vec(),
        })?;

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| LauncherError::io(parent, e))?;
        }
        tokio::fs::write(&self.path, bytes)
            .await
            .map_err(|e| LauncherError::io(&self.path, e))
    }

    /// Bookmark `server` unless an entry with the same `host[:port]`
    /// exists. New entries go first. Returns whether the file was written.
    pub async fn ensure_server(&self, server: &ServerAddress) -> LauncherResult<bool> {
        let servers = self.load().await;
        let address = server.address();

        if servers.iter().any(|entry| entry.ip == address) {
            debug!("Server {} already listed", address);
            return Ok(false);
        }

        let entry = ServerEntry::new(&address, server.name.as_deref().unwrap_or("Server"));
        let updated: Vec<ServerEntry> = std::iter::once(entry).chain(servers).collect();
        self.save(&updated).await?;
        info!("Added {} to server list", address);
        Ok(true)
    }
}
