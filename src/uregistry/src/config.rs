//! Configuration management for uregistry

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use uregistry::PackageFileVersion;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Config {
    /// Default UE4 object version for registry packages
    pub ue4_version: Option<i32>,
    /// Default UE5 object version for registry packages
    pub ue5_version: Option<i32>,
    /// Pretty-print JSON output
    #[serde(default)]
    pub pretty: bool,
}

impl Config {
    /// Get the path to the config file
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Could not determine config directory")?
            .join("uregistry");

        Ok(config_dir.join("config.toml"))
    }

    /// Load configuration from file, or defaults if it doesn't exist
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        toml::from_str(&contents).context("Failed to parse config file")
    }

    /// Save configuration to `path`, creating its directory
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory at {}", parent.display())
            })?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(path, contents)
            .with_context(|| format!("Failed to write config to {}", path.display()))?;

        Ok(())
    }

    /// Object versions to read with, command-line values taking precedence
    pub fn package_version(&self, ue4: Option<i32>, ue5: Option<i32>) -> PackageFileVersion {
        let latest = PackageFileVersion::LATEST;
        PackageFileVersion::new(
            ue4.or(self.ue4_version).unwrap_or(latest.ue4),
            ue5.or(self.ue5_version).unwrap_or(latest.ue5),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let config = Config {
            ue4_version: Some(522),
            ue5_version: Some(1004),
            pretty: true,
        };
        config.save_to(&path).unwrap();

        assert_eq!(Config::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "ue5_version = 1008\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.ue5_version, Some(1008));
        assert_eq!(config.ue4_version, None);
        assert!(!config.pretty);
    }

    #[test]
    fn test_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "pretty = \"very\"\n").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn test_package_version_precedence() {
        let config = Config {
            ue4_version: Some(510),
            ue5_version: None,
            pretty: false,
        };

        let version = config.package_version(None, None);
        assert_eq!(version.ue4, 510);
        assert_eq!(version.ue5, PackageFileVersion::LATEST.ue5);

        let version = config.package_version(Some(522), Some(0));
        assert_eq!(version, PackageFileVersion::new(522, 0));
    }
}
