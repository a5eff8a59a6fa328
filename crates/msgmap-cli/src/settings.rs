//! CLI settings file

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Log filter used when nothing else is configured
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Optional YAML settings; command-line flags take precedence
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub routes_dir: Option<PathBuf>,
    pub log_level: Option<String>,
}

impl Settings {
    /// Read settings from `path`
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read settings file {}", path.display()))?;
        Self::from_yaml(&content).with_context(|| format!("invalid settings file {}", path.display()))
    }

    pub fn from_yaml(yaml: &str) -> Result<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(yaml).map_err(|e| match e.location() {
            Some(at) => anyhow::anyhow!("{e} (line {}, column {})", at.line(), at.column()),
            None => anyhow::anyhow!("{e}"),
        })
    }

    /// Routes directory: flag, then settings file, then `./mappings`
    #[must_use]
    pub fn routes_dir(&self, flag: Option<PathBuf>) -> PathBuf {
        flag.or_else(|| self.routes_dir.clone())
            .unwrap_or_else(|| PathBuf::from(msgmap_translator::translator::DEFAULT_ROUTES_DIR))
    }
}
