// ─── Classpath & Natives ───
// Classpath joining and the scratch directory native libraries unpack into.

use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::debug;

use crate::core::downloader::ArtifactStore;
use crate::core::error::{LauncherError, LauncherResult};
use crate::core::version::{RuleContext, VersionJson};

/// Uses `;` on Windows, `:` on Linux/macOS.
pub fn classpath_separator() -> &'static str {
    if cfg!(target_os = "windows") {
        ";"
    } else {
        ":"
    }
}

/// Join entries in order. No sorting, no deduplication.
pub fn join_classpath(entries: &[PathBuf]) -> String {
    entries
        .iter()
        .map(|p| p.to_string_lossy())
        .collect::<Vec<_>>()
        .join(classpath_separator())
}

/// Scratch directory holding unpacked native libraries for one launch.
///
/// Removed from disk when dropped.
#[derive(Debug)]
pub struct NativesDir {
    dir: TempDir,
}

impl NativesDir {
    pub fn create() -> LauncherResult<Self> {
        let dir = tempfile::Builder::new()
            .prefix("natives-")
            .tempdir()
            .map_err(|e| LauncherError::io(std::env::temp_dir(), e))?;
        debug!("Created natives directory {:?}", dir.path());
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Stop managing the directory and leave it on disk.
    pub fn keep(self) -> PathBuf {
        let path = self.dir.keep();
        debug!("Keeping natives directory {:?}", path);
        path
    }

    /// Delete the directory now, reporting failures instead of ignoring them.
    pub fn close(self) -> LauncherResult<()> {
        let path = self.dir.path().to_path_buf();
        self.dir.close().map_err(|e| LauncherError::io(path, e))
    }
}

/// Unpack every allowed native classifier for `ctx.os` into a new
/// [`NativesDir`], honoring each library's exclusion patterns.
pub async fn unpack_natives(
    store: &dyn ArtifactStore,
    libraries_dir: &Path,
    manifest: &VersionJson,
    ctx: &RuleContext,
) -> LauncherResult<NativesDir> {
    let natives = NativesDir::create()?;

    for lib in &manifest.libraries {
        if !lib.is_allowed(ctx) {
            continue;
        }
        let Some(artifact) = lib.native_artifact(ctx.os) else {
            continue;
        };

        let archive = libraries_dir.join(&artifact.path);
        debug!("Unpacking {} into {:?}", lib.name, natives.path());
        store
            .unpack_archive(&archive, natives.path(), lib.extract_exclusions())
            .await?;
    }

    Ok(natives)
}
