//! Storefront API configuration module.
//!
//! Configuration is loaded from environment variables with fallback to
//! development defaults. A `.env` file, if present, is read first by `main`.

use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;
use std::time::Duration;

use gebeya_core::catalog::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

/// Storefront API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// HTTP listen port
    pub http_port: u16,

    /// HTTP listen address
    pub bind_addr: String,

    /// SQLite database file
    pub database_path: String,

    /// Connection pool size
    pub database_max_connections: u32,

    /// JWT secret key for verifying bearer tokens
    pub jwt_secret: String,

    /// JWT access token lifetime in seconds
    pub jwt_access_lifetime_secs: i64,

    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,

    /// Catalog page size when the request does not give one
    pub default_page_size: i64,
}

impl ApiConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let config = ApiConfig {
            http_port: parse_var("HTTP_PORT", "8080")?,

            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0".to_string()),

            database_path: env::var("DATABASE_PATH").unwrap_or_else(|_| "./gebeya.db".to_string()),

            database_max_connections: parse_var("DATABASE_MAX_CONNECTIONS", "5")?,

            jwt_secret: env::var("JWT_SECRET")
                .unwrap_or_else(|_| "gebeya-dev-secret-change-in-production".to_string()),

            jwt_access_lifetime_secs: parse_var("JWT_ACCESS_LIFETIME_SECS", "3600")?, // 1 hour

            request_timeout_secs: parse_var("REQUEST_TIMEOUT_SECS", "30")?,

            default_page_size: parse_var("DEFAULT_PAGE_SIZE", "20")?,
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.database_max_connections == 0 {
            return Err(ConfigError::InvalidValue("DATABASE_MAX_CONNECTIONS".to_string()));
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue("REQUEST_TIMEOUT_SECS".to_string()));
        }
        if !(1..=MAX_PAGE_SIZE).contains(&self.default_page_size) {
            return Err(ConfigError::InvalidValue("DEFAULT_PAGE_SIZE".to_string()));
        }
        if self.jwt_secret.trim().is_empty() {
            return Err(ConfigError::MissingRequired("JWT_SECRET".to_string()));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// `host:port` to bind.
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.http_port)
    }

    /// Development configuration with an explicit database path, used by
    /// tests and tools that do not read the environment.
    pub fn for_database(database_path: impl Into<String>) -> Self {
        ApiConfig {
            http_port: 8080,
            bind_addr: "127.0.0.1".to_string(),
            database_path: database_path.into(),
            database_max_connections: 5,
            jwt_secret: "gebeya-test-secret".to_string(),
            jwt_access_lifetime_secs: 3600,
            request_timeout_secs: 30,
            default_page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

fn parse_var<T: FromStr>(name: &str, default: &str) -> Result<T, ConfigError> {
    env::var(name)
        .unwrap_or_else(|_| default.to_string())
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidValue(name.to_string()))
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_var_default_and_invalid() {
        let port: u16 = parse_var("GEBEYA_TEST_UNSET_PORT", "8080").unwrap();
        assert_eq!(port, 8080);

        let err = parse_var::<u16>("GEBEYA_TEST_UNSET_PORT", "not-a-port").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(ref name) if name == "GEBEYA_TEST_UNSET_PORT"));
    }

    #[test]
    fn test_validate_rejects_bad_page_size() {
        let mut config = ApiConfig::for_database(":memory:");
        assert!(config.validate().is_ok());

        config.default_page_size = 0;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidValue(_))));
    }

    #[test]
    fn test_listen_addr() {
        let config = ApiConfig::for_database("./gebeya.db");
        assert_eq!(config.listen_addr(), "127.0.0.1:8080");
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
    }
}
