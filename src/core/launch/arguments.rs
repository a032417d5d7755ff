// ─── Argument Templates ───
// Rule-filtered `${placeholder}` substitution for JVM and game arguments.

use std::sync::LazyLock;

use regex::{Captures, Regex};
use tracing::debug;

use crate::core::config::LaunchOptions;
use crate::core::error::{LauncherError, LauncherResult};
use crate::core::version::{applies, ArgumentToken, RuleContext};

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\$\{[^}]*\}").unwrap());

/// Placeholder values, applied by literal replacement of every occurrence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubstitutionTable {
    entries: Vec<(String, String)>,
}

impl SubstitutionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// `name` is given without the `${}` wrapper.
    pub fn with(mut self, name: &str, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: &str, value: impl Into<String>) {
        let key = format!("${{{}}}", name);
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    fn lookup(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Replace every known placeholder in one pass. Substituted values are
    /// never scanned again; unknown placeholders are left in place.
    pub fn apply(&self, raw: &str) -> String {
        PLACEHOLDER
            .replace_all(raw, |caps: &Captures| {
                let key = &caps[0];
                self.lookup(key).unwrap_or(key).to_string()
            })
            .into_owned()
    }
}

/// Keep tokens whose rules allow them, flatten their values and substitute.
pub fn expand(
    tokens: &[ArgumentToken],
    ctx: &RuleContext,
    table: &SubstitutionTable,
) -> Vec<String> {
    tokens
        .iter()
        .filter(|token| applies(token.rules(), ctx))
        .flat_map(|token| token.values())
        .map(|value| table.apply(value))
        .collect()
}

/// Fail on the first argument still carrying a `${...}` placeholder.
pub fn ensure_resolved(kind: &'static str, args: &[String]) -> LauncherResult<()> {
    match args.iter().find(|arg| PLACEHOLDER.is_match(arg)) {
        Some(token) => Err(LauncherError::TemplateResolution {
            kind,
            token: token.clone(),
        }),
        None => Ok(()),
    }
}

/// JVM arguments, with `-Xmx`/`-Xms` appended for an explicit memory bound.
pub fn resolve_jvm_arguments(
    tokens: &[ArgumentToken],
    ctx: &RuleContext,
    table: &SubstitutionTable,
    options: &LaunchOptions,
) -> LauncherResult<Vec<String>> {
    let mut args = expand(tokens, ctx, table);

    if let Some(memory) = &options.memory {
        args.push(format!("-Xmx{}", memory));
        args.push(format!("-Xms{}", memory));
    }

    ensure_resolved("java", &args)?;
    debug!("Resolved {} JVM arguments", args.len());
    Ok(args)
}

/// Game arguments, with window size and direct-connect server appended.
pub fn resolve_game_arguments(
    tokens: &[ArgumentToken],
    ctx: &RuleContext,
    table: &SubstitutionTable,
    options: &LaunchOptions,
) -> LauncherResult<Vec<String>> {
    let mut args = expand(tokens, ctx, table);

    if let Some(resolution) = &options.resolution {
        args.extend([
            "--width".to_string(),
            resolution.width.to_string(),
            "--height".to_string(),
            resolution.height.to_string(),
        ]);
    }

    if let Some(server) = &options.server {
        args.extend([
            "--server".to_string(),
            server.host.clone(),
            "--port".to_string(),
            server.port_or_default().to_string(),
        ]);
    }

    ensure_resolved("game", &args)?;
    debug!("Resolved {} game arguments", args.len());
    Ok(args)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::{Resolution, ServerAddress};
    use crate::core::version::{FeatureSet, OsName, Rule};

    fn linux() -> RuleContext {
        RuleContext::new(OsName::Linux, FeatureSet::new())
    }

    fn tokens(raw: &[&str]) -> Vec<ArgumentToken> {
        raw.iter().map(|s| ArgumentToken::literal(*s)).collect()
    }

    #[test]
    fn replaces_every_occurrence() {
        let table = SubstitutionTable::new().with("natives_directory", "/tmp/n");
        assert_eq!(
            table.apply("-Dorg.lwjgl.librarypath=${natives_directory}:${natives_directory}"),
            "-Dorg.lwjgl.librarypath=/tmp/n:/tmp/n"
        );
    }

    #[test]
    fn conditioned_tokens_follow_rules() {
        let args = vec![
            ArgumentToken::literal("--username"),
            ArgumentToken::literal("${auth_player_name}"),
            ArgumentToken::conditioned(vec![Rule::allow().with_feature("is_demo_user", true)], "--demo"),
            ArgumentToken::conditioned(vec![Rule::allow().on_os(OsName::Linux)], "-Dlinux=1"),
        ];
        let table = SubstitutionTable::new().with("auth_player_name", "Steve");

        assert_eq!(
            expand(&args, &linux(), &table),
            vec!["--username", "Steve", "-Dlinux=1"]
        );

        let demo = RuleContext::new(OsName::Linux, FeatureSet::new().with("is_demo_user", true));
        assert!(expand(&args, &demo, &table).contains(&"--demo".to_string()));
    }

    #[test]
    fn missing_placeholder_is_a_template_error() {
        let args = tokens(&["--username", "${auth_player_name}", "--uuid", "${auth_uuid}"]);
        let table = SubstitutionTable::new().with("auth_player_name", "Steve");

        let err = resolve_game_arguments(&args, &linux(), &table, &LaunchOptions::default())
            .unwrap_err();

        match err {
            LauncherError::TemplateResolution { kind, token } => {
                assert_eq!(kind, "game");
                assert_eq!(token, "${auth_uuid}");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn complete_table_leaves_no_placeholders() {
        let args = tokens(&["-Djava.library.path=${natives_directory}", "-cp", "${classpath}"]);
        let table = SubstitutionTable::new()
            .with("natives_directory", "/n")
            .with("classpath", "/a.jar:/b.jar");
        let options = LaunchOptions {
            memory: Some("2G".into()),
            ..LaunchOptions::default()
        };

        let resolved = resolve_jvm_arguments(&args, &linux(), &table, &options).unwrap();
        assert_eq!(
            resolved,
            vec!["-Djava.library.path=/n", "-cp", "/a.jar:/b.jar", "-Xmx2G", "-Xms2G"]
        );
    }

    #[test]
    fn overrides_append_resolution_and_server() {
        let options = LaunchOptions {
            resolution: Some(Resolution {
                width: 854,
                height: 480,
            }),
            server: Some(ServerAddress::new("mc.example", None)),
            ..LaunchOptions::default()
        };

        let resolved = resolve_game_arguments(
            &tokens(&["--demo"]),
            &linux(),
            &SubstitutionTable::new(),
            &options,
        )
        .unwrap();

        assert_eq!(
            resolved,
            vec!["--demo", "--width", "854", "--height", "480", "--server", "mc.example", "--port", "25565"]
        );
    }

    #[test]
    fn substituted_values_are_not_expanded_again() {
        let table = SubstitutionTable::new()
            .with("auth_player_name", "${auth_uuid}")
            .with("auth_uuid", "0123");
        assert_eq!(
            table.apply("${auth_player_name}/${auth_uuid}/${unknown}"),
            "${auth_uuid}/0123/${unknown}"
        );
    }

    #[test]
    fn later_insert_overwrites() {
        let mut table = SubstitutionTable::new().with("version_type", "release");
        table.insert("version_type", "ignored");
        assert_eq!(table.apply("${version_type}"), "ignored");
    }
}
