//! API configuration
//!
//! Values come from `API_*` environment variables (a `.env` file is loaded
//! first by the server binary) and fall back to the defaults below. Nested
//! sections use a double underscore: `API_CACHE__MAX_CAPACITY`.

use std::time::Duration;

use infra_cache::CacheSettings;
use serde::Deserialize;

/// API configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// Database URL
    pub database_url: String,
    /// Log level used when `RUST_LOG` is unset
    pub log_level: String,
    /// HS256 signing secret
    pub jwt_secret: String,
    pub jwt_issuer: String,
    pub jwt_audience: String,
    /// Access token lifetime in minutes
    pub jwt_expiration_minutes: u64,
    pub cache: CacheSettings,
    /// Password given to the seeded `admin` user
    pub admin_password: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            database_url: "postgres://localhost/properties".to_string(),
            log_level: "info".to_string(),
            jwt_secret: "change-me-in-production-at-least-32-bytes".to_string(),
            jwt_issuer: "properties-api".to_string(),
            jwt_audience: "properties-clients".to_string(),
            jwt_expiration_minutes: 60,
            cache: CacheSettings::default(),
            admin_password: "Admin123!".to_string(),
        }
    }
}

impl ApiConfig {
    /// Loads configuration from environment
    pub fn from_env() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::Environment::with_prefix("API").separator("__"))
            .build()?
            .try_deserialize()
    }

    /// Returns the server address
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn access_token_ttl(&self) -> Duration {
        Duration::from_secs(self.jwt_expiration_minutes * 60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ApiConfig::default();
        assert_eq!(config.server_addr(), "0.0.0.0:8080");
        assert_eq!(config.access_token_ttl(), Duration::from_secs(3600));
    }
}
