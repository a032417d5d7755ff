use std::path::PathBuf;
use thiserror::Error;

/// Central error type for the launcher core.
/// Every module returns `Result<T, LauncherError>`.
#[derive(Debug, Error)]
pub enum LauncherError {
    // ── IO ──────────────────────────────────────────────
    #[error("IO error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    // ── Network ─────────────────────────────────────────
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Request to {url} failed: HTTP {status}")]
    RequestFailed { url: String, status: u16 },

    #[error("Download failed for {url} -> {dest:?}: {reason}")]
    DownloadFailed {
        url: String,
        dest: PathBuf,
        reason: String,
    },

    // ── Integrity ───────────────────────────────────────
    #[error("SHA-1 mismatch for {path:?}: expected {expected}, got {actual}")]
    Sha1Mismatch {
        path: PathBuf,
        expected: String,
        actual: String,
    },

    // ── Maven ───────────────────────────────────────────
    #[error("Invalid Maven coordinate: {0}")]
    InvalidMavenCoordinate(String),

    // ── Manifests ───────────────────────────────────────
    #[error("Malformed manifest {origin}: {reason}")]
    ManifestParse { origin: String, reason: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // ── Launch arguments ────────────────────────────────
    #[error("Unreplaced {kind} variable found \"{token}\"")]
    TemplateResolution { kind: &'static str, token: String },

    #[error("Failed to start {program:?}: {source}")]
    Spawn {
        program: PathBuf,
        source: std::io::Error,
    },

    // ── Archive ─────────────────────────────────────────
    #[error("Zip extraction error: {0}")]
    Zip(#[from] zip::result::ZipError),

    // ── Save files ──────────────────────────────────────
    #[error("NBT error: {0}")]
    Nbt(#[from] fastnbt::error::Error),

    // ── Generic ─────────────────────────────────────────
    #[error("{0}")]
    Other(String),
}

/// Convenience alias used throughout the crate.
pub type LauncherResult<T> = Result<T, LauncherError>;

impl From<std::io::Error> for LauncherError {
    fn from(source: std::io::Error) -> Self {
        LauncherError::Io {
            path: PathBuf::new(),
            source,
        }
    }
}

impl LauncherError {
    /// Wrap an IO error with the path it happened at.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        LauncherError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Decode a manifest document, reporting shape errors as [`LauncherError::ManifestParse`].
pub fn parse_manifest<T: serde::de::DeserializeOwned>(
    bytes: &[u8],
    origin: &str,
) -> LauncherResult<T> {
    serde_json::from_slice(bytes).map_err(|e| LauncherError::ManifestParse {
        origin: origin.to_string(),
        reason: e.to_string(),
    })
}
