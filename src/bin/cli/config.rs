use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

/// Minutes between scheduler checks when nothing else is configured
pub const DEFAULT_WATCH_EVERY_MINUTES: u64 = 5;

/// Optional `config.toml` for the CLI
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    pub vault_path: Option<PathBuf>,
    pub settings_path: Option<PathBuf>,
    pub api_url: Option<String>,
    pub watch_every_minutes: Option<u64>,
}

impl CliConfig {
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("avocado").join("config.toml"))
    }

    /// Load from `path`; a missing file means all defaults
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("No CLI config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn watch_every_minutes(&self) -> u64 {
        self.watch_every_minutes
            .unwrap_or(DEFAULT_WATCH_EVERY_MINUTES)
            .max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_is_default() {
        let temp = TempDir::new().unwrap();
        let config = CliConfig::load(&temp.path().join("config.toml")).unwrap();
        assert!(config.vault_path.is_none());
        assert_eq!(config.watch_every_minutes(), DEFAULT_WATCH_EVERY_MINUTES);
    }

    #[test]
    fn test_partial_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(&path, "vault_path = \"/notes\"\nwatch_every_minutes = 0\n").unwrap();

        let config = CliConfig::load(&path).unwrap();
        assert_eq!(config.vault_path, Some(PathBuf::from("/notes")));
        assert!(config.api_url.is_none());
        assert_eq!(config.watch_every_minutes(), 1);
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(&path, "vault_path = [").unwrap();
        assert!(CliConfig::load(&path).is_err());
    }
}
