// ABOUTME: Configuration management for the mssql-manager CLI
// ABOUTME: Handles connection profiles with an extensible JSON format

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::models::Endpoint;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),
    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] serde_json::Error),
    #[error("Config directory not found")]
    NoDirFound,
    #[error("Profile not found: {0}")]
    ProfileNotFound(String),
}

/// Connection settings for a SQL Server endpoint. These are the knobs the
/// original design packed into an ODBC driver string; with a native TDS
/// client they are plain fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectOptions {
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_true")]
    pub trust_certificate: bool,
}

fn default_port() -> u16 {
    1433
}

fn default_true() -> bool {
    true
}

impl Default for ConnectOptions {
    fn default() -> Self {
        Self {
            username: "sa".to_string(),
            password: String::new(),
            port: 1433,
            trust_certificate: true,
        }
    }
}

/// A stored connection profile: endpoint plus credentials.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionProfile {
    pub name: String,
    pub server: String,
    pub database: String,
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_true")]
    pub trust_certificate: bool,
}

impl Default for ConnectionProfile {
    fn default() -> Self {
        Self {
            name: "Default".to_string(),
            server: "localhost".to_string(),
            database: "master".to_string(),
            username: "sa".to_string(),
            password: String::new(),
            port: 1433,
            trust_certificate: true,
        }
    }
}

impl ConnectionProfile {
    /// Split into the pieces the library operations take.
    pub fn to_connection(&self) -> (Endpoint, ConnectOptions) {
        (
            Endpoint::new(&self.server, &self.database),
            ConnectOptions {
                username: self.username.clone(),
                password: self.password.clone(),
                port: self.port,
                trust_certificate: self.trust_certificate,
            },
        )
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default = "default_active_profile")]
    pub active_profile: String,
    #[serde(default)]
    pub profiles: HashMap<String, ConnectionProfile>,
}

fn default_version() -> u32 {
    1
}

fn default_active_profile() -> String {
    "default".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        let mut profiles = HashMap::new();
        profiles.insert("default".to_string(), ConnectionProfile::default());

        Self {
            version: 1,
            active_profile: "default".to_string(),
            profiles,
        }
    }
}

impl AppConfig {
    /// Get the config file path based on OS.
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoDirFound)?;
        let app_dir = config_dir.join("mssql-manager");
        Ok(app_dir.join("config.json"))
    }

    /// Load config from the default location, or create it if missing.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load config from an explicit path, creating a default file if missing.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            let config = Self::default();
            config.save_to(path)?;
            return Ok(config);
        }

        let contents = fs::read_to_string(path)?;
        let config: AppConfig = serde_json::from_str(&contents)?;
        Ok(config)
    }

    /// Save config to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::config_path()?)
    }

    /// Save config to an explicit path.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = serde_json::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Get the active connection profile.
    pub fn active_profile(&self) -> Result<&ConnectionProfile, ConfigError> {
        self.profiles
            .get(&self.active_profile)
            .ok_or_else(|| ConfigError::ProfileNotFound(self.active_profile.clone()))
    }

    /// Get a profile by key.
    pub fn profile(&self, key: &str) -> Result<&ConnectionProfile, ConfigError> {
        self.profiles
            .get(key)
            .ok_or_else(|| ConfigError::ProfileNotFound(key.to_string()))
    }

    /// Add or update a profile.
    pub fn set_profile(&mut self, key: String, profile: ConnectionProfile) {
        self.profiles.insert(key, profile);
    }

    /// Remove a profile (cannot remove if it's the only one).
    pub fn remove_profile(&mut self, key: &str) -> Result<(), ConfigError> {
        if self.profiles.len() <= 1 {
            return Err(ConfigError::ProfileNotFound(
                "Cannot remove the last profile".to_string(),
            ));
        }
        self.profiles.remove(key);

        // If we removed the active profile, switch to another one
        if self.active_profile == key {
            if let Some(first_key) = self.profiles.keys().next() {
                self.active_profile = first_key.clone();
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.version, 1);
        assert_eq!(config.active_profile, "default");
        assert!(config.profiles.contains_key("default"));
    }

    #[test]
    fn test_serialization() {
        let config = AppConfig::default();
        let json = serde_json::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.version, config.version);
        assert_eq!(parsed.active_profile, config.active_profile);
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = AppConfig::default();
        config.set_profile(
            "staging".to_string(),
            ConnectionProfile {
                name: "Staging".to_string(),
                server: "staging-sql,1533".to_string(),
                database: "Reporting".to_string(),
                username: "svc_reporting".to_string(),
                password: "secret".to_string(),
                port: 1533,
                trust_certificate: false,
            },
        );
        config.save_to(&path).unwrap();

        let loaded = AppConfig::load_from(&path).unwrap();
        let profile = loaded.profile("staging").unwrap();
        assert_eq!(profile.database, "Reporting");
        assert!(!profile.trust_certificate);

        let (endpoint, options) = profile.to_connection();
        assert_eq!(endpoint.host_and_port(), ("staging-sql".to_string(), 1533));
        assert_eq!(options.username, "svc_reporting");
    }

    #[test]
    fn test_load_from_creates_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let config = AppConfig::load_from(&path).unwrap();
        assert!(path.exists());
        assert!(config.profiles.contains_key("default"));
    }

    #[test]
    fn test_remove_last_profile_rejected() {
        let mut config = AppConfig::default();
        assert!(config.remove_profile("default").is_err());
    }
}
