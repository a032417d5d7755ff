// ─── InterfaceOficial Core ───
// Version resolution, library installation and game launch.
//
// Architecture:
//   core/
//     downloader/ Artifact store: cached, SHA-1 verified downloads + archives
//     version/    Mojang manifest, version JSON, OS/feature rules, resolver
//     maven/      Artifact coordinates and repository layout
//     loaders/    Vanilla and Forge library installation
//     assets/     Asset index + object downloads
//     launch/     Argument templates, classpath, natives, process spawn
//     mods/       Mods folder reconciliation
//     servers/    servers.dat bookmarks
//     client.rs   Facade tying the above to one game directory

pub mod assets;
pub mod auth;
pub mod client;
pub mod config;
pub mod downloader;
pub mod error;
pub mod http;
pub mod launch;
pub mod loaders;
pub mod maven;
pub mod mods;
pub mod progress;
pub mod servers;
pub mod version;
