//! Configuration loading and validation.
//!
//! Supports JSON5 format. Config location: `~/.menucard/menucard.json`,
//! overridable via `MENUCARD_STATE_DIR`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Default HTTP port.
const DEFAULT_PORT: u16 = 8083;
/// Default access token expiry in minutes.
const DEFAULT_ACCESS_EXPIRY_MINUTES: u64 = 15;
/// Default refresh token expiry in hours.
const DEFAULT_REFRESH_EXPIRY_HOURS: u64 = 12;

/// Fallback signing secret used when neither the config file nor
/// `MENUCARD_JWT_SECRET` provides one. A real deployment must override it;
/// the gateway logs a warning whenever this value is in effect.
pub const DEV_FALLBACK_SECRET: &str = "menucard-dev-secret";

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// IO error reading config file.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON5 parsing error.
    #[error("Parse error: {0}")]
    Parse(#[from] json5::Error),

    /// Config validation error.
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// HTTP server configuration.
    #[serde(default)]
    pub server: ServerConfig,

    /// Authentication configuration.
    #[serde(default)]
    pub auth: AuthConfig,
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// Missing file yields the defaults; env overrides are applied either way.
    ///
    /// # Errors
    ///
    /// Returns error if an existing config cannot be read or parsed.
    pub fn load_default() -> Result<Self, ConfigError> {
        let path = Self::default_path();
        let config = if path.exists() {
            Self::load(&path)?
        } else {
            Self::default()
        };
        Ok(config.with_env_overrides())
    }

    /// Load configuration from a specific path.
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = json5::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a path.
    ///
    /// # Errors
    ///
    /// Returns error if serialization or file write fails.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::Validation(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default config file path.
    #[must_use]
    pub fn default_path() -> PathBuf {
        Self::state_dir().join("menucard.json")
    }

    /// Get the Menucard state directory.
    ///
    /// Uses `MENUCARD_STATE_DIR` env var if set, otherwise `~/.menucard`.
    #[must_use]
    pub fn state_dir() -> PathBuf {
        if let Ok(dir) = std::env::var("MENUCARD_STATE_DIR") {
            PathBuf::from(dir)
        } else if let Some(home) = dirs::home_dir() {
            home.join(".menucard")
        } else {
            PathBuf::from(".menucard")
        }
    }

    /// Get the entity database directory.
    #[must_use]
    pub fn data_dir(&self) -> PathBuf {
        self.server
            .data_dir
            .clone()
            .unwrap_or_else(|| Self::state_dir().join("data"))
    }

    /// Get the uploaded-image directory.
    #[must_use]
    pub fn upload_dir(&self) -> PathBuf {
        self.server
            .upload_dir
            .clone()
            .unwrap_or_else(|| Self::state_dir().join("uploads"))
    }

    /// Apply environment variable overrides.
    #[must_use]
    pub fn with_env_overrides(mut self) -> Self {
        self.auth = self.auth.with_env_overrides();

        if let Ok(port) = std::env::var("MENUCARD_PORT") {
            if let Ok(port) = port.parse::<u16>() {
                self.server.port = port;
            }
        }

        if let Ok(origins) = std::env::var("MENUCARD_ALLOWED_ORIGINS") {
            for origin in origins.split(',').filter(|o| !o.trim().is_empty()) {
                self.server.cors_origins.push(origin.trim().to_string());
            }
        }

        self
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Validation(
                "Server port cannot be 0".to_string(),
            ));
        }

        if self.auth.access_expiry_minutes == 0 || self.auth.refresh_expiry_hours == 0 {
            return Err(ConfigError::Validation(
                "Token expiries cannot be 0".to_string(),
            ));
        }

        Ok(())
    }
}

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerConfig {
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Bind address.
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// Origins allowed by CORS.
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,

    /// Entity database directory (defaults to `<state>/data`).
    #[serde(default)]
    pub data_dir: Option<PathBuf>,

    /// Uploaded-image directory (defaults to `<state>/uploads`).
    #[serde(default)]
    pub upload_dir: Option<PathBuf>,
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_bind_address() -> String {
    "127.0.0.1".to_string()
}

fn default_cors_origins() -> Vec<String> {
    vec!["http://localhost:3000".to_string()]
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            bind_address: default_bind_address(),
            cors_origins: default_cors_origins(),
            data_dir: None,
            upload_dir: None,
        }
    }
}

/// Authentication configuration.
///
/// Immutable once handed to the gateway; the signing secret is injected at
/// process start and never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthConfig {
    /// JWT signing secret. Falls back to [`DEV_FALLBACK_SECRET`] if unset.
    #[serde(default)]
    pub jwt_secret: Option<String>,

    /// Access token expiry in minutes.
    #[serde(default = "default_access_expiry")]
    pub access_expiry_minutes: u64,

    /// Refresh token expiry in hours.
    #[serde(default = "default_refresh_expiry")]
    pub refresh_expiry_hours: u64,
}

fn default_access_expiry() -> u64 {
    DEFAULT_ACCESS_EXPIRY_MINUTES
}

fn default_refresh_expiry() -> u64 {
    DEFAULT_REFRESH_EXPIRY_HOURS
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: None,
            access_expiry_minutes: default_access_expiry(),
            refresh_expiry_hours: default_refresh_expiry(),
        }
    }
}

impl AuthConfig {
    /// Get access token expiry as Duration.
    #[must_use]
    pub const fn access_expiry(&self) -> Duration {
        Duration::from_secs(self.access_expiry_minutes * 60)
    }

    /// Get refresh token expiry as Duration.
    #[must_use]
    pub const fn refresh_expiry(&self) -> Duration {
        Duration::from_secs(self.refresh_expiry_hours * 3600)
    }

    /// Resolve the signing secret, falling back to the known dev default.
    ///
    /// Returns the secret and whether the fallback is in effect.
    #[must_use]
    pub fn resolve_secret(&self) -> (String, bool) {
        match &self.jwt_secret {
            Some(secret) if !secret.is_empty() => (secret.clone(), false),
            _ => (DEV_FALLBACK_SECRET.to_string(), true),
        }
    }

    /// Apply environment variable overrides.
    #[must_use]
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(secret) = std::env::var("MENUCARD_JWT_SECRET") {
            if !secret.is_empty() {
                self.jwt_secret = Some(secret);
            }
        }

        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = Config::default();
        assert_eq!(config.server.port, 8083);
        assert_eq!(config.server.bind_address, "127.0.0.1");
        assert_eq!(config.auth.access_expiry_minutes, 15);
        assert_eq!(config.auth.refresh_expiry_hours, 12);
        assert!(config.auth.jwt_secret.is_none());
    }

    #[test]
    fn expiry_durations() {
        let auth = AuthConfig::default();
        assert_eq!(auth.access_expiry(), Duration::from_secs(15 * 60));
        assert_eq!(auth.refresh_expiry(), Duration::from_secs(12 * 3600));
    }

    #[test]
    fn secret_falls_back_to_dev_default() {
        let auth = AuthConfig::default();
        let (secret, fallback) = auth.resolve_secret();
        assert_eq!(secret, DEV_FALLBACK_SECRET);
        assert!(fallback);

        let auth = AuthConfig {
            jwt_secret: Some("deployment-secret".to_string()),
            ..AuthConfig::default()
        };
        let (secret, fallback) = auth.resolve_secret();
        assert_eq!(secret, "deployment-secret");
        assert!(!fallback);
    }

    #[test]
    fn load_save_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("menucard.json");

        let mut config = Config::default();
        config.server.port = 9090;
        config.auth.jwt_secret = Some("s3cret".to_string());
        config.save(&path).unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded.server.port, 9090);
        assert_eq!(loaded.auth.jwt_secret.as_deref(), Some("s3cret"));
    }

    #[test]
    fn rejects_zero_port() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("menucard.json");
        std::fs::write(&path, r#"{ server: { port: 0 } }"#).unwrap();

        assert!(matches!(
            Config::load(&path),
            Err(ConfigError::Validation(_))
        ));
    }
}
