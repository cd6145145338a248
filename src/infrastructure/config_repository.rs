use crate::domain::entities::{InstallPaths, InstallerConfig};
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

pub struct ConfigRepository {
    config_path: PathBuf,
}

impl ConfigRepository {
    pub fn new() -> Self {
        let config_dir = dirs::config_dir()
            .map(|dir| dir.join("devstrap"))
            .unwrap_or_else(|| PathBuf::from("."));

        Self {
            config_path: config_dir.join("config.json"),
        }
    }

    pub fn at(config_path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: config_path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.config_path
    }

    pub fn load(&self) -> Result<InstallerConfig> {
        if !self.config_path.exists() {
            return Ok(InstallerConfig::default());
        }

        let content = fs::read_to_string(&self.config_path)
            .with_context(|| format!("Failed to read config file {}", self.config_path.display()))?;

        let config = serde_json::from_str(&content).context("Failed to parse config file")?;

        Ok(config)
    }

    pub fn save(&self, config: &InstallerConfig) -> Result<()> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let content = serde_json::to_string_pretty(config).context("Failed to serialize config")?;

        fs::write(&self.config_path, content).context("Failed to write config file")?;

        Ok(())
    }

    /// Resolves the user's directories, honoring overrides in `config`.
    pub fn resolve_paths(config: &InstallerConfig) -> Result<InstallPaths> {
        let home = dirs::home_dir().context("Could not determine the home directory")?;
        let config_home = dirs::config_dir().unwrap_or_else(|| home.join(".config"));
        Ok(InstallPaths::resolve(
            config,
            &home,
            &config_home,
            &std::env::temp_dir(),
        ))
    }
}

impl Default for ConfigRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let repository = ConfigRepository::at(dir.path().join("devstrap/config.json"));
        assert_eq!(repository.load().unwrap(), InstallerConfig::default());
    }

    #[test]
    fn save_then_load_keeps_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let repository = ConfigRepository::at(dir.path().join("devstrap/config.json"));
        let config = InstallerConfig {
            dry_run: true,
            download_timeout_secs: 30,
            ..InstallerConfig::default()
        };
        repository.save(&config).unwrap();
        assert_eq!(repository.load().unwrap(), config);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(ConfigRepository::at(path).load().is_err());
    }
}
