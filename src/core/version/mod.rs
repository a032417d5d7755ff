pub mod manifest;
pub mod resolver;
pub mod rules;
pub mod version_file;

pub use manifest::{VersionEntry, VersionManifest};
pub use resolver::{parse_build_id, GameVersion, LoaderSelector, LoaderVersion, VersionResolver};
pub use rules::{applies, FeatureSet, OsName, Rule, RuleAction, RuleContext};
pub use version_file::{
    ArgumentToken, ArgumentValue, Arguments, ConditionedValue, LibraryEntry, VersionJson,
    VersionType,
};
