// ─── Mod Reconciler ───
// Brings `<game_dir>/mods` in line with a desired mod list.

use std::collections::BTreeSet;
use std::path::Path;

use futures_util::future::try_join_all;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::core::downloader::ArtifactStore;
use crate::core::error::{LauncherError, LauncherResult};
use crate::core::progress::{fraction, Progress};

/// A mod jar to install. Identity on disk is `<file>.jar`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModDescriptor {
    /// File name without the `.jar` extension.
    pub file: String,
    pub url: String,
    #[serde(default)]
    pub sha1: Option<String>,
}

impl ModDescriptor {
    pub fn new(file: &str, url: &str) -> Self {
        Self {
            file: file.to_string(),
            url: url.to_string(),
            sha1: None,
        }
    }

    pub fn with_sha1(mut self, sha1: &str) -> Self {
        self.sha1 = Some(sha1.to_string());
        self
    }

    pub fn file_name(&self) -> String {
        format!("{}.jar", self.file)
    }
}

async fn installed_jars(mods_dir: &Path) -> LauncherResult<BTreeSet<String>> {
    let mut jars = BTreeSet::new();
    let mut dir = tokio::fs::read_dir(mods_dir)
        .await
        .map_err(|e| LauncherError::io(mods_dir, e))?;

    while let Some(entry) = dir
        .next_entry()
        .await
        .map_err(|e| LauncherError::io(mods_dir, e))?
    {
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.ends_with(".jar") {
            jars.insert(name);
        }
    }
    Ok(jars)
}

/// Install every mod in `mods`, in order. With `exclusive`, every other
/// `.jar` already in `mods_dir` is deleted afterwards.
pub async fn reconcile(
    store: &dyn ArtifactStore,
    mods_dir: &Path,
    mods: &[ModDescriptor],
    exclusive: bool,
    progress: &dyn Progress,
) -> LauncherResult<()> {
    tokio::fs::create_dir_all(mods_dir)
        .await
        .map_err(|e| LauncherError::io(mods_dir, e))?;

    let mut unwanted = if exclusive {
        installed_jars(mods_dir).await?
    } else {
        BTreeSet::new()
    };

    for (i, m) in mods.iter().enumerate() {
        progress.update(fraction(i, mods.len()));

        let file_name = m.file_name();
        let dest = mods_dir.join(&file_name);
        unwanted.remove(&file_name);

        match &m.sha1 {
            Some(sha1) => store.check_or_download(&m.url, sha1, &dest).await?,
            None => store.exists_or_download(&m.url, &dest).await?,
        }
        debug!("Mod ready: {}", file_name);
    }

    if !unwanted.is_empty() {
        info!("Removing {} mods not in the desired set", unwanted.len());
        try_join_all(unwanted.iter().map(|name| {
            let path = mods_dir.join(name);
            async move {
                tokio::fs::remove_file(&path)
                    .await
                    .map_err(|e| LauncherError::io(&path, e))
            }
        }))
        .await?;
    }

    progress.update(1.0);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::downloader::fake::FakeStore;
    use crate::core::downloader::sha1_hex;
    use crate::core::progress::recording::RecordingProgress;

    async fn listing(dir: &Path) -> BTreeSet<String> {
        installed_jars(dir).await.unwrap()
    }

    #[tokio::test]
    async fn exclusive_reconcile_leaves_exactly_desired_set() {
        let dir = tempfile::tempdir().unwrap();
        let mods_dir = dir.path().join("mods");
        tokio::fs::create_dir_all(&mods_dir).await.unwrap();
        tokio::fs::write(mods_dir.join("B.jar"), b"b").await.unwrap();
        tokio::fs::write(mods_dir.join("C.jar"), b"c").await.unwrap();
        tokio::fs::write(mods_dir.join("notes.txt"), b"keep").await.unwrap();

        let store = FakeStore::new().with_file("https://mods/A.jar", b"a");
        let mods = vec![
            ModDescriptor::new("A", "https://mods/A.jar").with_sha1(&sha1_hex(b"a")),
            ModDescriptor::new("B", "https://mods/B.jar"),
        ];

        reconcile(&store, &mods_dir, &mods, true, &RecordingProgress::default())
            .await
            .unwrap();

        let expected: BTreeSet<String> = ["A.jar", "B.jar"].iter().map(|s| s.to_string()).collect();
        assert_eq!(listing(&mods_dir).await, expected);
        assert!(mods_dir.join("notes.txt").exists());
        assert_eq!(store.download_count(), 1);
    }

    #[tokio::test]
    async fn non_exclusive_keeps_extra_jars() {
        let dir = tempfile::tempdir().unwrap();
        let mods_dir = dir.path().join("mods");
        tokio::fs::create_dir_all(&mods_dir).await.unwrap();
        tokio::fs::write(mods_dir.join("C.jar"), b"c").await.unwrap();

        let store = FakeStore::new().with_file("https://mods/A.jar", b"a");
        let mods = vec![ModDescriptor::new("A", "https://mods/A.jar")];

        reconcile(&store, &mods_dir, &mods, false, &RecordingProgress::default())
            .await
            .unwrap();

        assert!(mods_dir.join("A.jar").exists());
        assert!(mods_dir.join("C.jar").exists());
    }

    #[tokio::test]
    async fn zero_mods_still_completes() {
        let dir = tempfile::tempdir().unwrap();
        let mods_dir = dir.path().join("mods");
        let progress = RecordingProgress::default();

        reconcile(&FakeStore::new(), &mods_dir, &[], true, &progress)
            .await
            .unwrap();

        assert!(mods_dir.exists());
        assert_eq!(*progress.updates.lock().unwrap(), vec![1.0]);
    }

    #[tokio::test]
    async fn failed_mod_download_propagates() {
        let dir = tempfile::tempdir().unwrap();
        let mods = vec![ModDescriptor::new("gone", "https://mods/gone.jar")];

        let err = reconcile(
            &FakeStore::new(),
            dir.path(),
            &mods,
            false,
            &RecordingProgress::default(),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, LauncherError::DownloadFailed { .. }));
    }
}
