//! Configuration for planning runs.
//!
//! Load order: `.seedplan/config.toml` → environment variables → defaults.

use crate::flags::StaticFlags;
use crate::translation::SuffixPredicate;
use crate::unit::parse_bool_word;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Prefix for per-flag environment overrides: `SEEDPLAN_FLAG_ENABLE_REVIEWS=1`.
pub const FLAG_ENV_PREFIX: &str = "SEEDPLAN_FLAG_";

/// Top-level seedplan configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SeedplanConfig {
    pub planning: PlanningConfig,
    /// Feature flags consulted for conditions the planner does not resolve
    /// itself. Keys are uppercased on load.
    pub flags: BTreeMap<String, bool>,
}

/// Settings injected into the graph builder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanningConfig {
    /// Active content languages. More than one makes `multi_language` true
    /// when the context does not say otherwise.
    pub languages: Vec<String>,
    /// Platform-owned identity/permission record kinds. Relations to these
    /// never produce structural edges.
    pub reserved_record_kinds: Vec<String>,
    /// Platform-owned domains (record-kind prefixes). Relations into these
    /// never produce structural edges.
    pub reserved_domains: Vec<String>,
    /// Unit-name suffixes identifying translation units.
    pub translation_suffixes: Vec<String>,
}

impl Default for PlanningConfig {
    fn default() -> Self {
        Self {
            languages: vec!["en".to_string()],
            reserved_record_kinds: [
                "auth.user",
                "auth.group",
                "auth.permission",
                "contenttypes.contenttype",
                "sites.site",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            reserved_domains: ["admin", "contenttypes", "sessions"]
                .into_iter()
                .map(String::from)
                .collect(),
            translation_suffixes: vec!["translation".to_string()],
        }
    }
}

impl PlanningConfig {
    pub fn translation_predicate(&self) -> SuffixPredicate {
        SuffixPredicate::new(&self.translation_suffixes)
    }
}

impl SeedplanConfig {
    /// Load config from `.seedplan/config.toml` in the project root, with env var overrides.
    /// Falls back to defaults if no config file exists.
    pub fn load(project_root: &Path) -> Result<Self> {
        let config_path = project_root.join(".seedplan").join("config.toml");

        let config = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            toml::from_str(&content)?
        } else {
            Self::default()
        };

        config.with_env_overrides(std::env::vars())
    }

    /// Apply `SEEDPLAN_LANGUAGES` and `SEEDPLAN_FLAG_*` overrides, then
    /// normalize and validate.
    pub fn with_env_overrides<I>(mut self, vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (key, value) in vars {
            if key == "SEEDPLAN_LANGUAGES" {
                self.planning.languages = split_list(&value);
            } else if let Some(flag) = key.strip_prefix(FLAG_ENV_PREFIX) {
                let Some(enabled) = parse_bool_word(&value) else {
                    anyhow::bail!("{key}: expected a boolean, found `{value}`");
                };
                self.flags.insert(flag.to_string(), enabled);
            }
        }

        // Flag lookups are by uppercased name; normalize here so TOML keys can be
        // written in any case.
        self.flags = std::mem::take(&mut self.flags)
            .into_iter()
            .map(|(k, v)| (k.to_uppercase(), v))
            .collect();

        let planning = &mut self.planning;
        for list in [
            &mut planning.languages,
            &mut planning.reserved_record_kinds,
            &mut planning.reserved_domains,
        ] {
            *list = list
                .iter()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        if planning
            .translation_suffixes
            .iter()
            .any(|s| s.trim().is_empty())
        {
            anyhow::bail!("translation_suffixes must not contain empty entries");
        }

        Ok(self)
    }

    pub fn feature_flags(&self) -> StaticFlags {
        self.flags.iter().collect()
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flags::FeatureFlags;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_default_config() {
        let config = SeedplanConfig::default();
        assert_eq!(config.planning.languages, vec!["en"]);
        assert!(config.planning.reserved_record_kinds.contains(&"auth.user".to_string()));
        assert!(config.planning.reserved_domains.contains(&"sessions".to_string()));
        assert_eq!(config.planning.translation_suffixes, vec!["translation"]);
        assert!(config.flags.is_empty());
    }

    #[test]
    fn test_config_from_toml() {
        let toml_str = r#"
[planning]
languages = ["en", "de"]
reserved_domains = ["admin"]

[flags]
enable_reviews = true
"#;
        let config: SeedplanConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.planning.languages, vec!["en", "de"]);
        assert_eq!(config.planning.reserved_domains, vec!["admin"]);
        // Defaults for unspecified fields
        assert!(config.planning.reserved_record_kinds.contains(&"auth.group".to_string()));
        assert_eq!(config.flags.get("enable_reviews"), Some(&true));
    }

    #[test]
    fn test_config_load_nonexistent() {
        let config = SeedplanConfig::load(Path::new("/nonexistent/path")).unwrap();
        assert_eq!(config.planning.translation_suffixes, vec!["translation"]);
    }

    #[test]
    fn test_env_overrides() {
        let config = SeedplanConfig::default()
            .with_env_overrides(vars(&[
                ("SEEDPLAN_LANGUAGES", "en, fr ,,de"),
                ("SEEDPLAN_FLAG_ENABLE_REVIEWS", "yes"),
                ("SEEDPLAN_FLAG_beta", "0"),
                ("UNRELATED", "1"),
            ]))
            .unwrap();

        assert_eq!(config.planning.languages, vec!["en", "fr", "de"]);
        let flags = config.feature_flags();
        assert_eq!(flags.flag("ENABLE_REVIEWS"), Some(true));
        assert_eq!(flags.flag("BETA"), Some(false));
        assert_eq!(flags.len(), 2);
    }

    #[test]
    fn test_env_flag_must_be_boolean() {
        let err = SeedplanConfig::default()
            .with_env_overrides(vars(&[("SEEDPLAN_FLAG_X", "maybe")]))
            .unwrap_err();
        assert!(err.to_string().contains("SEEDPLAN_FLAG_X"));
    }

    #[test]
    fn test_empty_translation_suffix_rejected() {
        let mut config = SeedplanConfig::default();
        config.planning.translation_suffixes.push("  ".to_string());
        assert!(config.with_env_overrides(Vec::new()).is_err());
    }

    #[test]
    fn test_load_normalizes_flag_keys_to_uppercase() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join(".seedplan");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(
            dir.join("config.toml"),
            r#"
[flags]
Enable_Reviews = true
"#,
        )
        .unwrap();

        let config = SeedplanConfig::load(tmp.path()).unwrap();
        assert_eq!(config.flags.get("ENABLE_REVIEWS"), Some(&true));
    }
}
