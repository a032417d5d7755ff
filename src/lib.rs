pub mod core;

use tracing_subscriber::EnvFilter;

pub use crate::core::auth::AuthenticationResult;
pub use crate::core::client::MinecraftClient;
pub use crate::core::config::{ClientOptions, LaunchOptions, Resolution, ServerAddress};
pub use crate::core::downloader::{ArtifactStore, Downloader};
pub use crate::core::error::{LauncherError, LauncherResult};
pub use crate::core::launch::LaunchedGame;
pub use crate::core::mods::ModDescriptor;
pub use crate::core::progress::{CallbackProgress, LogProgress, Progress, SilentProgress};

/// Install the structured log subscriber. `RUST_LOG` overrides the default
/// filter. Calling it twice is harmless.
pub fn init_logging() {
    let initialized = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,interface_launcher=debug")),
        )
        .try_init()
        .is_ok();

    if initialized {
        tracing::info!("InterfaceOficial launcher core {} ready", crate::core::http::LAUNCHER_VERSION);
    }
}
