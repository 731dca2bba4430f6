//! Configuration management for neighborly.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "neighborly";

/// Default database file name.
const DATABASE_FILE_NAME: &str = "directory.db";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `NEIGHBORLY_`)
/// 2. TOML config file at `~/.config/neighborly/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server configuration.
    pub server: ServerConfig,
    /// Directory store configuration.
    pub directory: DirectoryConfig,
    /// Proximity search configuration.
    pub search: SearchConfig,
    /// Session authentication configuration.
    pub auth: AuthConfig,
}

/// HTTP server configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address the HTTP server binds to.
    pub bind: String,
}

/// Directory store configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectoryConfig {
    /// Path to the directory database file.
    /// Defaults to `~/.local/share/neighborly/directory.db`
    pub database_path: Option<PathBuf>,
}

/// Proximity search configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Radius in miles used when the request supplies none.
    pub default_radius_miles: f64,
    /// Maximum results returned per entity kind.
    pub max_results_per_kind: usize,
    /// Cap on concurrently running scans per request.
    ///
    /// The reference set is expected to be small, but a caller belonging to
    /// thousands of groups must not be able to fan out unbounded work.
    pub max_concurrent_scans: usize,
    /// Whole-search deadline in milliseconds.
    pub request_timeout_ms: u64,
}

/// Session authentication configuration.
///
/// Stands in for the external session layer: each entry maps a bearer
/// token to a resolved actor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Static session tokens accepted by the server.
    pub tokens: Vec<SessionTokenConfig>,
}

/// One configured session token and the actor it resolves to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionTokenConfig {
    /// The bearer token value.
    pub token: String,
    /// The active person for this session, if one is selected.
    pub person_id: Option<i64>,
    /// Whether the session belongs to a system admin.
    pub is_system_admin: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8080".to_string(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_radius_miles: 1.0,
            max_results_per_kind: 100,
            max_concurrent_scans: 50,
            request_timeout_ms: 10_000,
        }
    }
}

impl Default for SessionTokenConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            person_id: None,
            is_system_admin: false,
        }
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// Configuration is loaded in this order (later sources override earlier):
    /// 1. Default values
    /// 2. TOML config file (if exists)
    /// 3. Environment variables (prefixed with `NEIGHBORLY_`)
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file).nested())
            .merge(Env::prefixed("NEIGHBORLY_").split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if self.server.bind.parse::<SocketAddr>().is_err() {
            return Err(Error::ConfigValidation {
                message: format!("bind address '{}' is not a socket address", self.server.bind),
            });
        }

        if !self.search.default_radius_miles.is_finite() || self.search.default_radius_miles <= 0.0
        {
            return Err(Error::ConfigValidation {
                message: format!(
                    "default_radius_miles must be a positive finite number, got {}",
                    self.search.default_radius_miles
                ),
            });
        }

        if self.search.max_results_per_kind == 0 {
            return Err(Error::ConfigValidation {
                message: "max_results_per_kind must be greater than 0".to_string(),
            });
        }

        if self.search.max_concurrent_scans == 0 {
            return Err(Error::ConfigValidation {
                message: "max_concurrent_scans must be greater than 0".to_string(),
            });
        }

        if self.search.request_timeout_ms == 0 {
            return Err(Error::ConfigValidation {
                message: "request_timeout_ms must be greater than 0".to_string(),
            });
        }

        for token in &self.auth.tokens {
            if token.token.is_empty() {
                return Err(Error::ConfigValidation {
                    message: "auth tokens must not be empty".to_string(),
                });
            }
        }

        Ok(())
    }

    /// Get the database path, resolving defaults if not set.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.directory
            .database_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(DATABASE_FILE_NAME))
    }

    /// Get the whole-search deadline as a Duration.
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.search.request_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.server.bind, "127.0.0.1:8080");
        assert!((config.search.default_radius_miles - 1.0).abs() < f64::EPSILON);
        assert_eq!(config.search.max_results_per_kind, 100);
        assert_eq!(config.search.max_concurrent_scans, 50);
        assert!(config.auth.tokens.is_empty());
    }

    #[test]
    fn test_validate_valid_config() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_bad_bind_address() {
        let mut config = Config::default();
        config.server.bind = "not an address".to_string();

        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("bind address"));
    }

    #[test]
    fn test_validate_non_positive_radius() {
        let mut config = Config::default();
        config.search.default_radius_miles = 0.0;
        assert!(config.validate().is_err());

        config.search.default_radius_miles = -2.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_non_finite_radius() {
        let mut config = Config::default();
        config.search.default_radius_miles = f64::NAN;
        assert!(config.validate().is_err());

        config.search.default_radius_miles = f64::INFINITY;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_zero_max_results() {
        let mut config = Config::default();
        config.search.max_results_per_kind = 0;

        let result = config.validate();
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("max_results_per_kind"));
    }

    #[test]
    fn test_validate_zero_max_concurrent_scans() {
        let mut config = Config::default();
        config.search.max_concurrent_scans = 0;

        let result = config.validate();
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("max_concurrent_scans"));
    }

    #[test]
    fn test_validate_zero_timeout() {
        let mut config = Config::default();
        config.search.request_timeout_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_empty_auth_token() {
        let mut config = Config::default();
        config.auth.tokens.push(SessionTokenConfig::default());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_database_path_default() {
        let config = Config::default();
        let path = config.database_path();

        assert!(path.to_string_lossy().contains("directory.db"));
    }

    #[test]
    fn test_database_path_custom() {
        let mut config = Config::default();
        config.directory.database_path = Some(PathBuf::from("/custom/path/db.sqlite"));

        assert_eq!(
            config.database_path(),
            PathBuf::from("/custom/path/db.sqlite")
        );
    }

    #[test]
    fn test_request_timeout() {
        let config = Config::default();
        assert_eq!(config.request_timeout(), Duration::from_millis(10_000));
    }

    #[test]
    fn test_default_config_path() {
        let path = Config::default_config_path();
        assert!(path.to_string_lossy().contains("neighborly"));
        assert!(path.to_string_lossy().contains("config.toml"));
    }

    #[test]
    fn test_default_data_dir() {
        let path = Config::default_data_dir();
        assert!(path.to_string_lossy().contains("neighborly"));
    }

    #[test]
    fn test_load_nonexistent_config() {
        // Loading from a nonexistent path should work (uses defaults)
        let result = Config::load_from(Some(PathBuf::from("/nonexistent/config.toml")));
        assert!(result.is_ok());

        let config = result.unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_search_config_deserialize() {
        let json = r#"{"default_radius_miles": 2.5, "max_results_per_kind": 10}"#;
        let search: SearchConfig = serde_json::from_str(json).unwrap();
        assert!((search.default_radius_miles - 2.5).abs() < f64::EPSILON);
        assert_eq!(search.max_results_per_kind, 10);
        // Unspecified fields fall back to defaults.
        assert_eq!(search.max_concurrent_scans, 50);
    }

    #[test]
    fn test_auth_config_serialize() {
        let auth = AuthConfig {
            tokens: vec![SessionTokenConfig {
                token: "secret".to_string(),
                person_id: Some(1),
                is_system_admin: false,
            }],
        };
        let json = serde_json::to_string(&auth).unwrap();
        assert!(json.contains("secret"));
        assert!(json.contains("person_id"));
    }

    #[test]
    fn test_config_clone() {
        let config = Config::default();
        let cloned = config.clone();
        assert_eq!(config, cloned);
    }
}
