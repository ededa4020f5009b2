//! Configuration file handling.
//!
//! The check is normally configured in code through its builder methods;
//! this module additionally supports loading the same options from a TOML
//! file so deployments can tune the check without a rebuild.
//!
//! # Configuration Location
//!
//! The default configuration file lives at:
//! - Linux: `~/.config/advisory-check/config.toml`
//! - macOS: `~/Library/Application Support/advisory-check/config.toml`
//! - Windows: `%APPDATA%\advisory-check\config.toml`
//!
//! # Example Configuration
//!
//! ```toml
//! ignore_packages = ["internal/tool", "vendor/vendored-fork"]
//! retry_times = 5
//! cache_ttl_minutes = 60
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Options for a [`SecurityAdvisoriesCheck`].
///
/// A missing config file yields the defaults: nothing ignored, five retry
/// attempts, caching disabled.
///
/// [`SecurityAdvisoriesCheck`]: crate::check::SecurityAdvisoriesCheck
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Package names excluded from the reported inventory.
    pub ignore_packages: Vec<String>,

    /// Total fetch attempts per run.
    pub retry_times: u32,

    /// How long a fetched result stays cached, in minutes. 0 disables
    /// caching.
    pub cache_ttl_minutes: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ignore_packages: Vec::new(),
            retry_times: 5,
            cache_ttl_minutes: 0,
        }
    }
}

impl Config {
    /// Loads configuration from the default location, falling back to
    /// defaults when no file exists.
    pub fn load() -> Result<Self> {
        Self::from_path(&Self::config_path())
    }

    /// Loads configuration from an explicit path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let config = toml::from_str(&content)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        Ok(config)
    }

    /// Returns the default path of the configuration file.
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("advisory-check")
            .join("config.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();

        assert!(config.ignore_packages.is_empty());
        assert_eq!(config.retry_times, 5);
        assert_eq!(config.cache_ttl_minutes, 0);
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::from_path(&dir.path().join("config.toml")).unwrap();

        assert_eq!(config.retry_times, 5);
    }

    #[test]
    fn test_parses_partial_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"ignore_packages = [\"internal/tool\"]\ncache_ttl_minutes = 60\n")
            .unwrap();

        let config = Config::from_path(file.path()).unwrap();

        assert_eq!(config.ignore_packages, vec!["internal/tool"]);
        assert_eq!(config.cache_ttl_minutes, 60);
        assert_eq!(config.retry_times, 5);
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"retry_times = \"many\"\n").unwrap();

        assert!(Config::from_path(file.path()).is_err());
    }
}
