use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use wildmatch::WildMatch;

use crate::core::error::{LauncherError, LauncherResult};

/// Whether an archive entry is filtered out by one of `patterns`.
///
/// Manifests list directory prefixes such as `META-INF/`; glob-style
/// patterns (`*.sha1`) are matched too.
pub fn is_excluded(name: &str, patterns: &[String]) -> bool {
    patterns
        .iter()
        .any(|pattern| name.starts_with(pattern.as_str()) || WildMatch::new(pattern).matches(name))
}

/// Unpack `archive` into `dest`, returning the number of files written.
pub(super) async fn unpack(
    archive: &Path,
    dest: &Path,
    exclude: &[String],
) -> LauncherResult<usize> {
    let archive = archive.to_path_buf();
    let dest = dest.to_path_buf();
    let exclude = exclude.to_vec();

    tokio::task::spawn_blocking(move || unpack_blocking(&archive, &dest, &exclude))
        .await
        .map_err(|e| LauncherError::Other(format!("Task join error: {}", e)))?
}

fn unpack_blocking(archive: &Path, dest: &Path, exclude: &[String]) -> LauncherResult<usize> {
    let file = std::fs::File::open(archive).map_err(|e| LauncherError::io(archive, e))?;
    let mut zip = zip::ZipArchive::new(file)?;
    let mut written = 0;

    for i in 0..zip.len() {
        let mut entry = zip.by_index(i)?;
        if entry.is_dir() {
            continue;
        }

        let name = entry.name().to_string();
        if is_excluded(&name, exclude) {
            continue;
        }

        let Some(relative) = entry.enclosed_name() else {
            warn!("Skipping unsafe entry {:?} in {:?}", name, archive);
            continue;
        };
        let target: PathBuf = dest.join(relative);

        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent).map_err(|e| LauncherError::io(parent, e))?;
        }
        let mut out = std::fs::File::create(&target).map_err(|e| LauncherError::io(&target, e))?;
        std::io::copy(&mut entry, &mut out).map_err(|e| LauncherError::io(&target, e))?;
        written += 1;
    }

    debug!("Unpacked {} entries from {:?}", written, archive);
    Ok(written)
}
