//! Configuration file management for chat2repo.
//!
//! Settings are read from `~/.config/chat2repo/config.toml`, then overridden
//! by environment variables (`CHAT2REPO_URL`, `CHAT2REPO_TIMEOUT`). Command
//! line flags are applied on top by the binary.

use chat2repo_core::{ChatError, ChatMode, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

const ENV_URL: &str = "CHAT2REPO_URL";
const ENV_TIMEOUT: &str = "CHAT2REPO_TIMEOUT";

/// Default repository for repo mode.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepoDefaults {
    pub owner: String,
    pub name: String,
    #[serde(rename = "ref")]
    pub git_ref: String,
}

/// Root configuration structure for config.toml
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub base_url: String,
    pub request_timeout_secs: u64,
    pub default_mode: ChatMode,
    pub language: Option<String>,
    pub repo: RepoDefaults,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            default_mode: ChatMode::Tech,
            language: None,
            repo: RepoDefaults::default(),
        }
    }
}

impl ClientConfig {
    /// Loads the default file plus environment overrides.
    pub fn load() -> Result<Self> {
        Self::load_with(None)
    }

    /// Loads `path` (or the default file when `None`) plus environment overrides.
    pub fn load_with(path: Option<&Path>) -> Result<Self> {
        let mut config = match (path, config_dir()) {
            (Some(path), _) => Self::load_from(path)?,
            (None, Some(dir)) => Self::load_from(&dir.join("config.toml"))?,
            (None, None) => {
                tracing::warn!("[Config] Could not determine home directory, using defaults");
                Self::default()
            }
        };
        config.apply_overrides(
            std::env::var(ENV_URL).ok(),
            std::env::var(ENV_TIMEOUT).ok(),
        )?;
        Ok(config)
    }

    /// Loads a config file. A missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("[Config] {} not found, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| {
            ChatError::config(format!(
                "Failed to parse configuration file at {}: {}",
                path.display(),
                e
            ))
        })
    }

    /// Applies URL and timeout overrides given as raw strings.
    pub fn apply_overrides(&mut self, url: Option<String>, timeout: Option<String>) -> Result<()> {
        if let Some(url) = url.filter(|u| !u.trim().is_empty()) {
            self.base_url = url.trim().to_string();
        }
        if let Some(raw) = timeout {
            self.request_timeout_secs = raw.trim().parse().map_err(|_| {
                ChatError::config(format!("Timeout must be a whole number of seconds, got '{raw}'"))
            })?;
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }
}

/// Returns the configuration directory: ~/.config/chat2repo
pub fn config_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".config").join("chat2repo"))
}

/// Returns the log directory: ~/.config/chat2repo/logs
pub fn log_dir() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("logs"))
}
