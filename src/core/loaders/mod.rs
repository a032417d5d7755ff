pub mod forge;
pub mod installer;
pub mod vanilla;

pub use forge::{ForgeInstallProfile, ForgeLibrary, LibraryOutcome};
pub use installer::{InstallationState, LibraryManager};
