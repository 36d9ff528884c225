//! Configuration management for ivx.
//!
//! Loads configuration from ${IVX_HOME}/config.toml with sensible defaults.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Default API base URL when neither env nor config provides one.
pub const DEFAULT_BASE_URL: &str = "http://localhost:5000/api";

/// Environment variable overriding the API base URL.
pub const BASE_URL_ENV: &str = "IVX_API_BASE_URL";

/// Interview service connection settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the interview service API (if present).
    pub base_url: Option<String>,
}

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Interview service connection settings.
    pub api: ApiConfig,

    /// Candidate name to send on session start (optional).
    pub candidate_name: Option<String>,
}

impl Config {
    /// Loads configuration from the default config path.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load() -> Result<Self> {
        Self::load_from(&paths::config_path())
    }

    /// Loads configuration from a specific path.
    /// Returns defaults if the file doesn't exist.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config from {}", path.display()))
        } else {
            Ok(Config::default())
        }
    }

    /// Resolves the API base URL with precedence: env > config > default.
    ///
    /// # Errors
    /// Returns an error if the resolved URL is not well-formed.
    pub fn resolve_base_url(&self) -> Result<String> {
        if let Ok(env_url) = std::env::var(BASE_URL_ENV) {
            let trimmed = env_url.trim();
            if !trimmed.is_empty() {
                validate_url(trimmed)?;
                return Ok(trimmed.trim_end_matches('/').to_string());
            }
        }

        if let Some(config_url) = self.api.base_url.as_deref() {
            let trimmed = config_url.trim();
            if !trimmed.is_empty() {
                validate_url(trimmed)?;
                return Ok(trimmed.trim_end_matches('/').to_string());
            }
        }

        Ok(DEFAULT_BASE_URL.to_string())
    }
}

/// Validates that a URL is well-formed.
fn validate_url(url: &str) -> Result<()> {
    url::Url::parse(url).with_context(|| format!("Invalid interview service URL: {url}"))?;
    Ok(())
}

pub mod paths {
    //! Path resolution for ivx configuration.
    //!
    //! IVX_HOME resolution order:
    //! 1. IVX_HOME environment variable (if set)
    //! 2. ~/.config/ivx (default)

    use std::path::PathBuf;

    /// Returns the ivx home directory.
    pub fn ivx_home() -> PathBuf {
        if let Ok(home) = std::env::var("IVX_HOME") {
            return PathBuf::from(home);
        }

        dirs::home_dir()
            .map(|h| h.join(".config").join("ivx"))
            .expect("Could not determine home directory")
    }

    /// Returns the path to the config.toml file.
    pub fn config_path() -> PathBuf {
        ivx_home().join("config.toml")
    }
}
