mod artifact;

pub use artifact::MavenArtifact;

/// Default host for libraries that do not name their own repository.
pub const MOJANG_LIBRARIES: &str = "https://libraries.minecraft.net";
/// Second attempt for loader libraries missing from their primary host.
pub const MAVEN_CENTRAL: &str = "https://repo1.maven.org/maven2";
pub const FORGE_MAVEN: &str = "https://maven.minecraftforge.net";
pub const FORGE_PROMOTIONS: &str =
    "https://files.minecraftforge.net/net/minecraftforge/forge/promotions_slim.json";
