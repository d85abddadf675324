//! Configuration storage

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::srtp::{self, suite, CryptoSuite};

/// Default master key lifetime for generated attributes (2^31 packets).
const DEFAULT_LIFETIME: u64 = 1 << 31;

/// Application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Suite names to offer and accept, most preferred first
    pub preferred_suites: Vec<String>,
    /// SRTP key derivation rate (0 = derive session keys once)
    pub key_derivation_rate: u64,
    /// Master key lifetime written into generated crypto attributes (0 = omit)
    pub lifetime: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            preferred_suites: suite::supported()
                .iter()
                .map(|s| s.name.to_string())
                .collect(),
            key_derivation_rate: 0,
            lifetime: DEFAULT_LIFETIME,
        }
    }
}

impl Config {
    /// Get config directory path
    fn config_dir() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("com", "srtp-sdes", "srtp-sdes")
            .context("Could not determine config directory")?;
        Ok(proj_dirs.config_dir().to_path_buf())
    }

    /// Get config file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Load configuration from the default location
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load configuration from `path`, falling back to defaults if it doesn't exist
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).context("Failed to read config file")?;
        toml::from_str(&content).context("Failed to parse config file")
    }

    /// Save configuration to the default location
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    /// Save configuration to `path`
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).context("Failed to create config directory")?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, content).context("Failed to write config file")?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = fs::Permissions::from_mode(0o600);
            fs::set_permissions(path, perms).context("Failed to set config permissions")?;
        }

        Ok(())
    }

    /// Lifetime to put in a generated attribute, `None` when configured as 0.
    pub fn attribute_lifetime(&self) -> Option<u64> {
        (self.lifetime != 0).then_some(self.lifetime)
    }

    /// Resolve `preferred_suites` through the registry.
    ///
    /// An unregistered name is an error rather than being skipped.
    pub fn preferred(&self) -> srtp::Result<Vec<&'static CryptoSuite>> {
        self.preferred_suites
            .iter()
            .map(|name| srtp::lookup(name))
            .collect()
    }
}
