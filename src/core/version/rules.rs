// ─── Rule Evaluation ───
// Allow/disallow clauses keyed on platform name or feature flags.
// Shared by libraries, native classifiers and argument tokens.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Platform names as they appear in Mojang manifests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OsName {
    Linux,
    Osx,
    Windows,
}

impl OsName {
    /// The platform this binary was built for.
    pub fn current() -> Self {
        if cfg!(target_os = "windows") {
            OsName::Windows
        } else if cfg!(target_os = "macos") {
            OsName::Osx
        } else {
            OsName::Linux
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OsName::Linux => "linux",
            OsName::Osx => "osx",
            OsName::Windows => "windows",
        }
    }
}

impl fmt::Display for OsName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Feature flags toggled by the launcher configuration
/// (`is_demo_user`, `has_custom_resolution`, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureSet(BTreeMap<String, bool>);

impl FeatureSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &str, enabled: bool) -> Self {
        self.set(name, enabled);
        self
    }

    pub fn set(&mut self, name: &str, enabled: bool) {
        self.0.insert(name.to_string(), enabled);
    }

    /// Unknown features are off.
    pub fn is_enabled(&self, name: &str) -> bool {
        self.0.get(name).copied().unwrap_or(false)
    }
}

/// Everything a rule can be evaluated against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleContext {
    pub os: OsName,
    pub features: FeatureSet,
}

impl RuleContext {
    pub fn new(os: OsName, features: FeatureSet) -> Self {
        Self { os, features }
    }

    pub fn current(features: FeatureSet) -> Self {
        Self::new(OsName::current(), features)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleAction {
    Allow,
    Disallow,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OsRule {
    #[serde(default)]
    pub name: Option<OsName>,
    /// Decoded for completeness; not used for matching.
    #[serde(default)]
    pub arch: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    pub action: RuleAction,
    #[serde(default)]
    pub os: Option<OsRule>,
    #[serde(default)]
    pub features: Option<BTreeMap<String, bool>>,
}

impl Rule {
    pub fn allow() -> Self {
        Self {
            action: RuleAction::Allow,
            os: None,
            features: None,
        }
    }

    pub fn disallow() -> Self {
        Self {
            action: RuleAction::Disallow,
            ..Self::allow()
        }
    }

    pub fn on_os(mut self, os: OsName) -> Self {
        self.os = Some(OsRule {
            name: Some(os),
            ..OsRule::default()
        });
        self
    }

    pub fn with_feature(mut self, name: &str, value: bool) -> Self {
        self.features
            .get_or_insert_with(BTreeMap::new)
            .insert(name.to_string(), value);
        self
    }

    fn os_name(&self) -> Option<OsName> {
        self.os.as_ref().and_then(|os| os.name)
    }

    /// A rule matches on its OS name, OR on all of its features holding,
    /// OR unconditionally when it names neither.
    pub fn matches(&self, ctx: &RuleContext) -> bool {
        let os_match = self.os_name().map(|name| name == ctx.os);
        let feature_match = self
            .features
            .as_ref()
            .filter(|features| !features.is_empty())
            .map(|features| {
                features
                    .iter()
                    .all(|(name, wanted)| ctx.features.is_enabled(name) == *wanted)
            });

        match (os_match, feature_match) {
            (None, None) => true,
            (os, features) => os.unwrap_or(false) || features.unwrap_or(false),
        }
    }
}

/// Fold the rule list: every matching rule overwrites the verdict, so the
/// last match wins. An empty list is always allowed.
pub fn applies(rules: &[Rule], ctx: &RuleContext) -> bool {
    if rules.is_empty() {
        return true;
    }

    rules.iter().fold(false, |allowed, rule| {
        if rule.matches(ctx) {
            rule.action == RuleAction::Allow
        } else {
            allowed
        }
    })
}
