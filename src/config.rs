//! Configuration file support for showtracker.
//!
//! This module provides functionality for loading and saving user preferences
//! from a TOML configuration file.

use crate::error::{Result, TrackerError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::PathBuf;

/// Environment variable that overrides the configured OMDb API key.
pub const API_KEY_ENV: &str = "OMDB_API_KEY";

/// User configuration settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding `.showdb.json` and `.tracker.json`
    #[serde(default)]
    pub database_dir: Option<String>,

    /// Base URL of the OMDb API
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// OMDb API key
    #[serde(default)]
    pub api_key: Option<String>,

    /// Watchlist read by `--watchlist` when no path is given
    #[serde(default = "default_watchlist")]
    pub watchlist: String,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

fn default_api_url() -> String {
    "http://www.omdbapi.com".to_string()
}

fn default_watchlist() -> String {
    "watchlist.txt".to_string()
}

impl Config {
    /// Create a new config with default values.
    pub fn new() -> Self {
        Self {
            database_dir: None,
            api_url: default_api_url(),
            api_key: None,
            watchlist: default_watchlist(),
        }
    }

    /// Get the path to the config file.
    ///
    /// Returns ~/.config/showtracker/config.toml on Linux,
    /// or a platform-appropriate location on other systems.
    pub fn get_config_path() -> std::result::Result<PathBuf, io::Error> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| {
                io::Error::new(io::ErrorKind::NotFound, "Could not find config directory")
            })?
            .join("showtracker");

        Ok(config_dir.join("config.toml"))
    }

    /// Load config from disk.
    ///
    /// Returns default config if the file doesn't exist.
    pub fn load() -> Result<Self> {
        let path = Self::get_config_path()?;

        if !path.exists() {
            return Ok(Self::new());
        }

        let content = fs::read_to_string(&path)?;
        Self::from_toml(&content)
    }

    /// Parse config from TOML text.
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }

    /// The API key, preferring `override_key` (normally the environment).
    pub fn resolve_api_key(&self, override_key: Option<String>) -> Option<String> {
        override_key
            .filter(|k| !k.trim().is_empty())
            .or_else(|| self.api_key.clone())
    }

    /// The database directory, falling back to `~/.showtracker`.
    pub fn resolve_database_dir(&self) -> Result<PathBuf> {
        match &self.database_dir {
            Some(dir) => Ok(expand_home(dir)),
            None => crate::storage::Store::default_dir().map_err(|e| {
                TrackerError::Config(format!("no database directory configured: {}", e))
            }),
        }
    }
}

/// Expand a leading `~/` to the home directory.
fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_config_has_defaults() {
        let config = Config::new();
        assert!(config.database_dir.is_none());
        assert_eq!(config.api_url, "http://www.omdbapi.com");
        assert!(config.api_key.is_none());
        assert_eq!(config.watchlist, "watchlist.txt");
    }

    #[test]
    fn test_config_serialization() {
        let config = Config {
            database_dir: Some("/tmp/shows".to_string()),
            api_url: "http://localhost:8080".to_string(),
            api_key: Some("abc123".to_string()),
            watchlist: "shows.txt".to_string(),
        };

        let toml_str = toml::to_string(&config).unwrap();
        assert!(toml_str.contains("database_dir = \"/tmp/shows\""));
        assert!(toml_str.contains("api_url = \"http://localhost:8080\""));
        assert!(toml_str.contains("api_key = \"abc123\""));
        assert!(toml_str.contains("watchlist = \"shows.txt\""));
    }

    #[test]
    fn test_config_partial_deserialization() {
        // Only specify some fields, rest should use defaults
        let config = Config::from_toml(r#"api_key = "k3y""#).unwrap();
        assert_eq!(config.api_key.as_deref(), Some("k3y"));
        assert_eq!(config.api_url, "http://www.omdbapi.com"); // default
        assert_eq!(config.watchlist, "watchlist.txt"); // default
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = Config::from_toml("api_key = ").unwrap_err();
        assert!(matches!(err, TrackerError::Config(_)));
    }

    #[test]
    fn test_api_key_override() {
        let mut config = Config::new();
        config.api_key = Some("from-file".to_string());
        assert_eq!(
            config.resolve_api_key(Some("from-env".to_string())).as_deref(),
            Some("from-env")
        );
        assert_eq!(
            config.resolve_api_key(Some("  ".to_string())).as_deref(),
            Some("from-file")
        );
        assert_eq!(config.resolve_api_key(None).as_deref(), Some("from-file"));
    }

    #[test]
    fn test_explicit_database_dir() {
        let mut config = Config::new();
        config.database_dir = Some("/var/lib/shows".to_string());
        assert_eq!(
            config.resolve_database_dir().unwrap(),
            PathBuf::from("/var/lib/shows")
        );
    }
}
