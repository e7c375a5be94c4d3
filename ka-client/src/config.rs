//! Client configuration
//!
//! Values come from the environment (a `.env` file in the working directory is
//! loaded first when present) and can be overridden with the `with_*` builders.

use crate::remote::StorePaths;
use std::path::PathBuf;
use thiserror::Error;

/// Default priority styles shown first in the item list
pub const DEFAULT_PRIORITY_STYLES: &[&str] = &["A039", "A042", "F074", "SB06", "TS09", "BR08"];

/// Style selected when the catalog first loads
pub const DEFAULT_STYLE: &str = "A039";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },

    #[error("Missing value for {0}")]
    Missing(&'static str),
}

impl ConfigError {
    pub fn code(&self) -> shared::ErrorCode {
        shared::ErrorCode::ConfigError
    }
}

/// Client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Realtime database base URL (e.g. "https://ka-retail.firebaseio.com")
    pub database_url: String,

    /// Database auth token appended as `?auth=`
    pub database_auth: Option<String>,

    /// Auth RPC endpoint
    pub rpc_url: String,

    /// Directory holding the catalog cache, the session file and logs
    pub work_dir: PathBuf,

    /// Request timeout in seconds
    pub timeout: u64,

    /// Log level used when `RUST_LOG` is not set
    pub log_level: String,

    /// JSON log output (production)
    pub log_json: bool,

    /// "development" or "production"
    pub environment: String,

    /// Styles listed first, in this order
    pub priority_styles: Vec<String>,

    /// Style selected by default after loading
    pub default_style: String,

    /// Remote data paths
    pub paths: StorePaths,
}

impl ClientConfig {
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            database_auth: None,
            rpc_url: "http://localhost:8080/exec".into(),
            work_dir: PathBuf::from("./work_dir"),
            timeout: 30,
            log_level: "info".into(),
            log_json: false,
            environment: "development".into(),
            priority_styles: DEFAULT_PRIORITY_STYLES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            default_style: DEFAULT_STYLE.into(),
            paths: StorePaths::default(),
        }
    }

    /// Build the configuration from `KA_*` environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        // Missing .env is fine
        let _ = dotenv::dotenv();

        let mut config = Self::new(
            std::env::var("KA_DATABASE_URL").unwrap_or_else(|_| "http://localhost:9000".into()),
        );

        config.database_auth = std::env::var("KA_DATABASE_AUTH")
            .ok()
            .filter(|v| !v.is_empty());
        if let Ok(url) = std::env::var("KA_RPC_URL") {
            config.rpc_url = url;
        }
        if let Ok(dir) = std::env::var("KA_WORK_DIR") {
            config.work_dir = PathBuf::from(dir);
        }
        if let Ok(v) = std::env::var("KA_REQUEST_TIMEOUT_SECS") {
            config.timeout = v.parse().map_err(|_| ConfigError::InvalidValue {
                key: "KA_REQUEST_TIMEOUT_SECS",
                value: v.clone(),
            })?;
        }
        if let Ok(level) = std::env::var("KA_LOG_LEVEL") {
            config.log_level = level;
        }
        if let Ok(v) = std::env::var("KA_LOG_JSON") {
            config.log_json = v.parse().map_err(|_| ConfigError::InvalidValue {
                key: "KA_LOG_JSON",
                value: v.clone(),
            })?;
        }
        if let Ok(env) = std::env::var("KA_ENVIRONMENT") {
            config.environment = env;
        }
        if let Ok(list) = std::env::var("KA_PRIORITY_STYLES") {
            config.priority_styles = parse_list(&list);
        }
        if let Ok(style) = std::env::var("KA_DEFAULT_STYLE") {
            config.default_style = style;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn with_database_auth(mut self, token: impl Into<String>) -> Self {
        self.database_auth = Some(token.into());
        self
    }

    pub fn with_rpc_url(mut self, url: impl Into<String>) -> Self {
        self.rpc_url = url.into();
        self
    }

    pub fn with_work_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.work_dir = dir.into();
        self
    }

    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout = seconds;
        self
    }

    pub fn with_priority_styles(mut self, styles: Vec<String>) -> Self {
        self.priority_styles = styles;
        self
    }

    pub fn with_paths(mut self, paths: StorePaths) -> Self {
        self.paths = paths;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database_url.trim().is_empty() {
            return Err(ConfigError::Missing("KA_DATABASE_URL"));
        }
        if !self.database_url.starts_with("http://") && !self.database_url.starts_with("https://") {
            return Err(ConfigError::InvalidValue {
                key: "KA_DATABASE_URL",
                value: self.database_url.clone(),
            });
        }
        if self.timeout == 0 {
            return Err(ConfigError::InvalidValue {
                key: "KA_REQUEST_TIMEOUT_SECS",
                value: "0".into(),
            });
        }
        Ok(())
    }

    /// redb catalog cache file
    pub fn cache_path(&self) -> PathBuf {
        self.work_dir.join("catalog.redb")
    }

    /// Persisted login session
    pub fn session_path(&self) -> PathBuf {
        self.work_dir.join("session.json")
    }

    pub fn log_dir(&self) -> PathBuf {
        self.work_dir.join("logs")
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new("http://localhost:9000")
    }
}

fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.timeout, 30);
        assert_eq!(config.priority_styles.len(), 6);
        assert_eq!(config.priority_styles[0], "A039");
        assert_eq!(config.default_style, "A039");
        assert_eq!(config.paths.catalog_items, "catalog/items");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_derived_paths() {
        let config = ClientConfig::default().with_work_dir("/tmp/ka");
        assert_eq!(config.cache_path(), PathBuf::from("/tmp/ka/catalog.redb"));
        assert_eq!(config.session_path(), PathBuf::from("/tmp/ka/session.json"));
        assert_eq!(config.log_dir(), PathBuf::from("/tmp/ka/logs"));
    }

    #[test]
    fn test_validate_rejects_bad_url_and_timeout() {
        assert!(ClientConfig::new("ftp://db").validate().is_err());
        assert!(ClientConfig::new("").validate().is_err());
        assert!(ClientConfig::default().with_timeout(0).validate().is_err());
    }

    #[test]
    fn test_parse_list() {
        assert_eq!(parse_list(" A039, ,F074,"), vec!["A039", "F074"]);
        assert!(parse_list("").is_empty());
    }
}
