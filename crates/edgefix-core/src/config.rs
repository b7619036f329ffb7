//! `edgefix.toml` configuration.
//!
//! Every field is optional; missing fields fall back to the built-in sets.

use std::path::{Path, PathBuf};

use log::debug;
use regex::Regex;
use serde::Deserialize;

use crate::error::ConfigError;

pub const CONFIG_FILE: &str = "edgefix.toml";

const DEFAULT_HANDLER_FILE: &str = "index.ts";

const DEFAULT_EXCLUDED: &[&str] = &[
    "_shared",
    "generate-email-pitch",
    "tests",
    "competitor-intelligence-cron",
    "seed-projects",
    "seed-users",
    "deploy-to-vercel",
];

const DEFAULT_USER_SCOPED: &[&str] = &[
    "ai-career-coach",
    "ai-lead-finder",
    "ai-task-executor",
    "ai-task-router",
    "auto-sync-finances",
    "enrich-project-intelligence",
    "generate-actionable-insights",
    "generate-business-ideas",
    "generate-complete-business",
    "generate-learning-path",
    "generate-playbook",
    "generate-predictions",
    "generate-role-questions-v2",
    "generate-tasks-v2",
    "prepare-one-on-one",
    "suggest-optimal-schedule",
    "sync-stripe",
];

const DEFAULT_CORS_ONLY: &[&str] = &["export-excel"];

const DEFAULT_ENTRY_POINT: &str = r"(?:Deno\.)?serve\(\s*async\s*\(\s*req\b[^)]*\)\s*=>\s*\{";

const DEFAULT_IMPORT_ANCHOR: &str = r#"import\s*\{\s*serve\s*\}\s*from\s*['"]https://deno\.land/std@[^'"]+/http/server\.ts['"]\s*;?"#;

fn owned(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Handler file name inside each function directory.
    pub handler_file: String,
    pub excluded: Vec<String>,
    pub user_scoped: Vec<String>,
    pub cors_only: Vec<String>,
    pub anchors: AnchorConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            handler_file: DEFAULT_HANDLER_FILE.to_string(),
            excluded: owned(DEFAULT_EXCLUDED),
            user_scoped: owned(DEFAULT_USER_SCOPED),
            cors_only: owned(DEFAULT_CORS_ONLY),
            anchors: AnchorConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnchorConfig {
    /// Pattern matching the opening of the request handler.
    pub entry_point: String,
    /// Pattern matching the import that new imports are placed after.
    pub import: String,
}

impl Default for AnchorConfig {
    fn default() -> Self {
        Self {
            entry_point: DEFAULT_ENTRY_POINT.to_string(),
            import: DEFAULT_IMPORT_ANCHOR.to_string(),
        }
    }
}

impl Config {
    pub fn parse(text: &str, path: &Path) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text, path)
    }

    /// Load `explicit` if given, otherwise `edgefix.toml` next to the
    /// functions directory, otherwise the built-in defaults.
    pub fn discover(explicit: Option<&Path>, functions_dir: &Path) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        match Self::default_path(functions_dir) {
            Some(path) if path.is_file() => {
                debug!("Using config {}", path.display());
                Self::load(&path)
            }
            _ => {
                debug!("No {CONFIG_FILE} found, using built-in defaults");
                Ok(Self::default())
            }
        }
    }

    fn default_path(functions_dir: &Path) -> Option<PathBuf> {
        let dir = if functions_dir.as_os_str().is_empty() {
            Path::new(".")
        } else {
            functions_dir
        };
        let parent = dir.canonicalize().ok()?.parent()?.to_path_buf();
        Some(parent.join(CONFIG_FILE))
    }

    /// A function may belong to at most one set.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let sets: [(&'static str, &[String]); 3] = [
            ("excluded", &self.excluded),
            ("user_scoped", &self.user_scoped),
            ("cors_only", &self.cors_only),
        ];
        for (i, &(first, names)) in sets.iter().enumerate() {
            for &(second, others) in &sets[i + 1..] {
                if let Some(name) = names.iter().find(|n| others.contains(n)) {
                    return Err(ConfigError::Overlap {
                        name: name.clone(),
                        first,
                        second,
                    });
                }
            }
        }
        Ok(())
    }

    pub fn anchors(&self) -> Result<Anchors, ConfigError> {
        Anchors::new(&self.anchors)
    }
}

/// Compiled anchor patterns.
#[derive(Debug, Clone)]
pub struct Anchors {
    pub entry_point: Regex,
    pub import: Regex,
}

impl Anchors {
    pub fn new(config: &AnchorConfig) -> Result<Self, ConfigError> {
        let compile = |anchor: &'static str, pattern: &str| {
            Regex::new(pattern).map_err(|source| ConfigError::InvalidPattern { anchor, source })
        };
        Ok(Self {
            entry_point: compile("entry_point", &config.entry_point)?,
            import: compile("import", &config.import)?,
        })
    }
}

impl Default for Anchors {
    fn default() -> Self {
        Self {
            entry_point: Regex::new(DEFAULT_ENTRY_POINT).unwrap(),
            import: Regex::new(DEFAULT_IMPORT_ANCHOR).unwrap(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_disjoint() {
        Config::default().validate().unwrap();
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() -> anyhow::Result<()> {
        let config = Config::parse(
            "cors_only = [\"export-excel\", \"public-feed\"]\n",
            Path::new("edgefix.toml"),
        )?;
        assert_eq!(config.cors_only, ["export-excel", "public-feed"]);
        assert_eq!(config.handler_file, "index.ts");
        assert!(config.user_scoped.contains(&"sync-stripe".to_string()));
        Ok(())
    }

    #[test]
    fn test_overlap_is_rejected() {
        let err = Config::parse(
            "excluded = [\"a\"]\nuser_scoped = [\"b\"]\ncors_only = [\"b\"]\n",
            Path::new("edgefix.toml"),
        )
        .unwrap_err();
        match err {
            ConfigError::Overlap { name, first, second } => {
                assert_eq!(name, "b");
                assert_eq!(first, "user_scoped");
                assert_eq!(second, "cors_only");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let err = Config::parse("exclude = []\n", Path::new("edgefix.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_invalid_anchor() {
        let config = Config::parse("[anchors]\nentry_point = '('\n", Path::new("edgefix.toml")).unwrap();
        let err = config.anchors().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPattern { anchor: "entry_point", .. }));
    }

    #[test]
    fn test_default_anchors() {
        let anchors = Anchors::default();
        assert!(anchors.entry_point.is_match("serve(async (req) => {"));
        assert!(anchors.entry_point.is_match("Deno.serve(async (req: Request) => {"));
        assert!(anchors.import.is_match(
            "import { serve } from \"https://deno.land/std@0.168.0/http/server.ts\";"
        ));
    }

    #[test]
    fn test_discover_finds_file_next_to_functions_dir() -> anyhow::Result<()> {
        let root = tempfile::tempdir()?;
        let functions = root.path().join("functions");
        std::fs::create_dir(&functions)?;
        assert_eq!(Config::discover(None, &functions)?.cors_only, ["export-excel"]);

        std::fs::write(root.path().join(CONFIG_FILE), "cors_only = [\"feed\"]\n")?;
        assert_eq!(Config::discover(None, &functions)?.cors_only, ["feed"]);
        Ok(())
    }
}
