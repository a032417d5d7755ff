// ─── Version File ───
// Strict schema for a Mojang version JSON, legacy and structured arguments.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::rules::{applies, OsName, Rule, RuleContext};
use crate::core::error::{parse_manifest, LauncherError, LauncherResult};

/// A fully parsed Mojang version JSON.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionJson {
    pub id: String,
    pub main_class: String,
    #[serde(rename = "type", default)]
    pub version_type: VersionType,
    #[serde(default)]
    pub libraries: Vec<LibraryEntry>,
    #[serde(default)]
    pub downloads: Option<VersionDownloads>,
    #[serde(default)]
    pub asset_index: Option<AssetIndexInfo>,
    #[serde(default)]
    pub assets: Option<String>,
    #[serde(default)]
    pub arguments: Option<Arguments>,
    /// Legacy `minecraftArguments` field (pre-1.13).
    #[serde(default)]
    pub minecraft_arguments: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VersionType {
    Release,
    Snapshot,
    /// Set by loader overlays, whose arguments do not carry a version type.
    #[serde(skip_deserializing)]
    Ignored,
    #[default]
    #[serde(other)]
    Unknown,
}

impl VersionType {
    pub fn as_str(self) -> &'static str {
        match self {
            VersionType::Release => "release",
            VersionType::Snapshot => "snapshot",
            VersionType::Unknown => "unknown",
            VersionType::Ignored => "ignored",
        }
    }
}

impl fmt::Display for VersionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct VersionDownloads {
    pub client: DownloadArtifact,
    #[serde(default)]
    pub server: Option<DownloadArtifact>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DownloadArtifact {
    pub sha1: String,
    pub size: u64,
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetIndexInfo {
    pub id: String,
    pub url: String,
    #[serde(default)]
    pub sha1: Option<String>,
    #[serde(default)]
    pub total_size: Option<u64>,
}

// ─── Arguments ───

/// Ordered JVM and game argument templates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Arguments {
    #[serde(default)]
    pub game: Vec<ArgumentToken>,
    #[serde(default)]
    pub jvm: Vec<ArgumentToken>,
}

/// One argument template: a bare literal, or values gated by rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ArgumentToken {
    Literal(String),
    Conditioned(ConditionedValue),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionedValue {
    #[serde(default)]
    pub rules: Vec<Rule>,
    pub value: ArgumentValue,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ArgumentValue {
    One(String),
    Many(Vec<String>),
}

impl ArgumentToken {
    pub fn literal(value: impl Into<String>) -> Self {
        ArgumentToken::Literal(value.into())
    }

    pub fn conditioned(rules: Vec<Rule>, value: impl Into<String>) -> Self {
        ArgumentToken::Conditioned(ConditionedValue {
            rules,
            value: ArgumentValue::One(value.into()),
        })
    }

    /// Literals carry no rules and are always allowed.
    pub fn rules(&self) -> &[Rule] {
        match self {
            ArgumentToken::Literal(_) => &[],
            ArgumentToken::Conditioned(c) => &c.rules,
        }
    }

    pub fn values(&self) -> Vec<&str> {
        match self {
            ArgumentToken::Literal(s) => vec![s.as_str()],
            ArgumentToken::Conditioned(c) => match &c.value {
                ArgumentValue::One(s) => vec![s.as_str()],
                ArgumentValue::Many(values) => values.iter().map(String::as_str).collect(),
            },
        }
    }
}

const LEGACY_GC_FLAGS: [&str; 6] = [
    "-XX:+UnlockExperimentalVMOptions",
    "-XX:+UseG1GC",
    "-XX:G1NewSizePercent=20",
    "-XX:G1ReservePercent=20",
    "-XX:MaxGCPauseMillis=50",
    "-XX:G1HeapRegionSize=16M",
];

impl Arguments {
    /// Arguments for manifests that only carry a `minecraftArguments` string.
    pub fn legacy(minecraft_arguments: &str) -> Self {
        Self {
            game: split_legacy(minecraft_arguments),
            jvm: legacy_jvm_arguments(),
        }
    }
}

pub(crate) fn split_legacy(minecraft_arguments: &str) -> Vec<ArgumentToken> {
    minecraft_arguments
        .split_whitespace()
        .map(ArgumentToken::literal)
        .collect()
}

/// Default JVM template for legacy manifests, with G1 tuning and the
/// first-thread flag macOS needs for windowing.
pub fn legacy_jvm_arguments() -> Vec<ArgumentToken> {
    let mut jvm: Vec<ArgumentToken> = [
        "-Djava.library.path=${natives_directory}",
        "-Dminecraft.launcher.brand=${launcher_name}",
        "-Dminecraft.launcher.version=${launcher_version}",
        "-cp",
        "${classpath}",
    ]
    .into_iter()
    .chain(LEGACY_GC_FLAGS)
    .map(ArgumentToken::literal)
    .collect();

    jvm.push(ArgumentToken::conditioned(
        vec![Rule::allow().on_os(OsName::Osx)],
        "-XstartOnFirstThread",
    ));
    jvm
}

// ─── Library Entry with Rules ───

#[derive(Debug, Clone, Deserialize)]
pub struct LibraryEntry {
    pub name: String,
    #[serde(default)]
    pub downloads: Option<LibraryDownloads>,
    #[serde(default)]
    pub rules: Vec<Rule>,
    #[serde(default)]
    pub natives: Option<HashMap<OsName, String>>,
    #[serde(default)]
    pub extract: Option<ExtractRules>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LibraryDownloads {
    #[serde(default)]
    pub artifact: Option<LibDownloadArtifact>,
    #[serde(default)]
    pub classifiers: HashMap<String, LibDownloadArtifact>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LibDownloadArtifact {
    pub path: String,
    pub sha1: String,
    pub size: u64,
    pub url: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExtractRules {
    #[serde(default)]
    pub exclude: Vec<String>,
}

impl LibraryEntry {
    pub fn is_allowed(&self, ctx: &RuleContext) -> bool {
        applies(&self.rules, ctx)
    }

    /// The artifact this library puts on the classpath, if any.
    /// Libraries that declare natives never do.
    pub fn classpath_artifact(&self) -> Option<&LibDownloadArtifact> {
        if self.natives.is_some() {
            return None;
        }
        self.downloads.as_ref()?.artifact.as_ref()
    }

    /// The native classifier artifact for `os`, with `${arch}` expanded.
    pub fn native_artifact(&self, os: OsName) -> Option<&LibDownloadArtifact> {
        let classifier = self.natives.as_ref()?.get(&os)?.replace("${arch}", arch_bits());
        self.downloads.as_ref()?.classifiers.get(&classifier)
    }

    pub fn extract_exclusions(&self) -> &[String] {
        self.extract
            .as_ref()
            .map(|e| e.exclude.as_slice())
            .unwrap_or(&[])
    }
}

fn arch_bits() -> &'static str {
    if cfg!(target_pointer_width = "64") {
        "64"
    } else {
        "32"
    }
}

impl VersionJson {
    pub fn parse(bytes: &[u8], origin: &str) -> LauncherResult<Self> {
        parse_manifest(bytes, origin)
    }

    /// Structured arguments when present, otherwise the legacy string.
    pub fn launch_arguments(&self) -> LauncherResult<Arguments> {
        match (&self.arguments, &self.minecraft_arguments) {
            (Some(arguments), _) => Ok(arguments.clone()),
            (None, Some(legacy)) => Ok(Arguments::legacy(legacy)),
            (None, None) => Err(LauncherError::ManifestParse {
                origin: self.id.clone(),
                reason: "neither `arguments` nor `minecraftArguments` present".into(),
            }),
        }
    }

    /// Asset index name: `assets`, else `assetIndex.id`, else `legacy`.
    pub fn asset_index_id(&self) -> String {
        self.assets
            .clone()
            .or_else(|| self.asset_index.as_ref().map(|ai| ai.id.clone()))
            .unwrap_or_else(|| "legacy".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::version::rules::FeatureSet;

    #[test]
    fn version_type_decodes_known_and_unknown_labels() {
        let decode = |raw: &str| serde_json::from_str::<VersionType>(raw).unwrap();
        assert_eq!(decode(r#""release""#), VersionType::Release);
        assert_eq!(decode(r#""snapshot""#), VersionType::Snapshot);
        assert_eq!(decode(r#""old_beta""#), VersionType::Unknown);
        assert_eq!(decode(r#""ignored""#), VersionType::Unknown);
    }

    #[test]
    fn structured_arguments_decode_into_tokens() {
        let parsed = VersionJson::parse(
            serde_json::json!({
                "id": "1.20.4",
                "mainClass": "net.minecraft.client.main.Main",
                "type": "release",
                "arguments": {
                    "game": [
                        "--username",
                        "${auth_player_name}",
                        {
                            "rules": [{"action": "allow", "features": {"is_demo_user": true}}],
                            "value": "--demo"
                        },
                        {
                            "rules": [{"action": "allow", "features": {"has_custom_resolution": true}}],
                            "value": ["--width", "${resolution_width}"]
                        }
                    ],
                    "jvm": ["-cp", "${classpath}"]
                }
            })
            .to_string()
            .as_bytes(),
            "1.20.4",
        )
        .unwrap();

        let args = parsed.launch_arguments().unwrap();
        assert_eq!(args.game.len(), 4);
        assert_eq!(args.game[0], ArgumentToken::literal("--username"));
        assert_eq!(args.game[3].values(), vec!["--width", "${resolution_width}"]);
        assert_eq!(args.game[2].rules().len(), 1);
        assert_eq!(parsed.version_type, VersionType::Release);
    }

    #[test]
    fn legacy_arguments_split_and_get_default_jvm() {
        let parsed = VersionJson::parse(
            br#"{
                "id": "1.12.2",
                "mainClass": "net.minecraft.client.main.Main",
                "type": "old_beta",
                "minecraftArguments": "--username ${auth_player_name}  --version ${version_name}"
            }"#,
            "1.12.2",
        )
        .unwrap();

        let args = parsed.launch_arguments().unwrap();
        assert_eq!(args.game.len(), 4);
        assert!(args.jvm.contains(&ArgumentToken::literal("-XX:+UseG1GC")));
        assert!(args.jvm.contains(&ArgumentToken::literal("${classpath}")));
        assert_eq!(parsed.version_type, VersionType::Unknown);
    }

    #[test]
    fn first_thread_flag_is_gated_on_macos() {
        let jvm = legacy_jvm_arguments();
        let gated = jvm.last().unwrap();
        assert_eq!(gated.values(), vec!["-XstartOnFirstThread"]);

        let osx = RuleContext::new(OsName::Osx, FeatureSet::new());
        let linux = RuleContext::new(OsName::Linux, FeatureSet::new());
        assert!(applies(gated.rules(), &osx));
        assert!(!applies(gated.rules(), &linux));
    }

    #[test]
    fn unknown_argument_shape_is_rejected() {
        let err = VersionJson::parse(
            br#"{"id": "x", "mainClass": "M", "arguments": {"game": [42]}}"#,
            "x",
        )
        .unwrap_err();
        assert!(matches!(err, LauncherError::ManifestParse { .. }));
    }

    #[test]
    fn manifest_without_arguments_is_rejected() {
        let parsed = VersionJson::parse(br#"{"id": "x", "mainClass": "M"}"#, "x").unwrap();
        assert!(parsed.launch_arguments().is_err());
    }

    #[test]
    fn natives_pick_platform_classifier() {
        let lib: LibraryEntry = serde_json::from_value(serde_json::json!({
            "name": "org.lwjgl.lwjgl:lwjgl-platform:2.9.4",
            "natives": {"linux": "natives-linux", "windows": "natives-windows-${arch}"},
            "extract": {"exclude": ["META-INF/"]},
            "downloads": {
                "artifact": {"path": "a.jar", "sha1": "aa", "size": 1, "url": "https://x/a.jar"},
                "classifiers": {
                    "natives-linux": {"path": "l.jar", "sha1": "bb", "size": 1, "url": "https://x/l.jar"},
                    "natives-windows-64": {"path": "w64.jar", "sha1": "cc", "size": 1, "url": "https://x/w64.jar"},
                    "natives-windows-32": {"path": "w32.jar", "sha1": "dd", "size": 1, "url": "https://x/w32.jar"}
                }
            }
        }))
        .unwrap();

        assert!(lib.classpath_artifact().is_none());
        assert_eq!(lib.native_artifact(OsName::Linux).unwrap().path, "l.jar");
        assert!(lib.native_artifact(OsName::Osx).is_none());
        let windows = &lib.native_artifact(OsName::Windows).unwrap().path;
        assert!(windows == "w64.jar" || windows == "w32.jar");
        assert_eq!(lib.extract_exclusions(), ["META-INF/".to_string()]);
    }

    #[test]
    fn asset_index_id_prefers_assets_field() {
        let parsed = VersionJson::parse(
            br#"{"id": "x", "mainClass": "M", "assets": "1.12",
                 "assetIndex": {"id": "other", "url": "https://x/i.json"}}"#,
            "x",
        )
        .unwrap();
        assert_eq!(parsed.asset_index_id(), "1.12");
    }
}
