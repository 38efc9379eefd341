//! Configuration Module
//!
//! Persistent settings for the API host, the OAuth client, and CLI defaults.
//! Config is stored in `~/.config/gsc-batch/config.toml`.
//!
//! ## Priority Order (highest to lowest)
//!
//! 1. Environment variables (`GSC_ACCESS_TOKEN`, `GSC_CLIENT_ID`, `GSC_CLIENT_SECRET`, `GSC_BASE_URL`)
//! 2. Config file (`~/.config/gsc-batch/config.toml`)
//! 3. Defaults
//!
//! `GSC_CONFIG_DIR` relocates the whole directory (config + token cache).

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{GscError, Result};
use crate::util::DEFAULT_BASE_URL;

/// Default number of days for search analytics queries
pub const DEFAULT_DAYS: u32 = 28;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct GscConfig {
    #[serde(default)]
    pub api: ApiSettings,

    #[serde(default)]
    pub oauth: OAuthSettings,

    #[serde(default)]
    pub defaults: Defaults,

    /// Explicit access token. Only ever set from `GSC_ACCESS_TOKEN`, never written to disk.
    #[serde(skip)]
    pub access_token: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ApiSettings {
    /// API host override (default: searchconsole.googleapis.com)
    pub base_url: Option<String>,
}

/// OAuth client used to refresh expired tokens
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct OAuthSettings {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    /// Token endpoint override (default: oauth2.googleapis.com/token)
    pub token_url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Defaults {
    /// Property used when a command omits the site argument
    pub site_url: Option<String>,

    /// Days of search analytics to fetch
    pub days: Option<u32>,
}

impl GscConfig {
    /// Get the config directory path
    ///
    /// `$GSC_CONFIG_DIR` if set, otherwise `~/.config/gsc-batch/` on Unix,
    /// `%APPDATA%/gsc-batch/` on Windows
    pub fn config_dir() -> PathBuf {
        if let Some(dir) = std::env::var_os("GSC_CONFIG_DIR").filter(|d| !d.is_empty()) {
            return PathBuf::from(dir);
        }

        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("gsc-batch")
    }

    /// `<config dir>/config.toml`
    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// `<config dir>/tokens.json`
    pub fn tokens_path() -> PathBuf {
        Self::config_dir().join("tokens.json")
    }

    /// Load configuration from the default path
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Load configuration from `path`
    ///
    /// Returns default config if file doesn't exist.
    /// Returns error if file exists but is malformed.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| GscError::ConfigError {
            reason: format!("Failed to read config file: {}", e),
        })?;

        toml::from_str(&content).map_err(|e| GscError::ConfigError {
            reason: format!("Failed to parse config file: {}", e),
        })
    }

    /// Save configuration to `path`, creating the directory if needed
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            if !dir.as_os_str().is_empty() && !dir.exists() {
                fs::create_dir_all(dir).map_err(|e| GscError::ConfigError {
                    reason: format!("Failed to create config directory: {}", e),
                })?;
            }
        }

        let content = toml::to_string_pretty(self).map_err(|e| GscError::ConfigError {
            reason: format!("Failed to serialize config: {}", e),
        })?;

        fs::write(path, content).map_err(|e| GscError::ConfigError {
            reason: format!("Failed to write config file: {}", e),
        })
    }

    /// Merge with environment variables
    ///
    /// Environment variables take precedence over config file values.
    pub fn with_env(mut self) -> Self {
        let var = |name: &str| std::env::var(name).ok().filter(|v| !v.is_empty());

        if let Some(token) = var("GSC_ACCESS_TOKEN") {
            self.access_token = Some(token);
        }
        if let Some(id) = var("GSC_CLIENT_ID") {
            self.oauth.client_id = Some(id);
        }
        if let Some(secret) = var("GSC_CLIENT_SECRET") {
            self.oauth.client_secret = Some(secret);
        }
        if let Some(url) = var("GSC_BASE_URL") {
            self.api.base_url = Some(url);
        }

        self
    }

    /// API host, without a trailing slash
    pub fn base_url(&self) -> &str {
        self.api
            .base_url
            .as_deref()
            .unwrap_or(DEFAULT_BASE_URL)
            .trim_end_matches('/')
    }

    pub fn default_days(&self) -> u32 {
        self.defaults.days.unwrap_or(DEFAULT_DAYS)
    }

    /// Check if an OAuth client is configured (refresh possible)
    pub fn has_oauth_client(&self) -> bool {
        self.oauth.client_id.is_some() && self.oauth.client_secret.is_some()
    }
}
