//! Server configuration management.
//!
//! Consolidates all environment variable reads and provides validated configuration.

use axum::http::HeaderValue;
use fair_roulette::engine::{ConfigError, EngineConfig, parse_env_or};
use std::net::{Ipv4Addr, SocketAddr};

/// Default listening port
pub const DEFAULT_PORT: u16 = 3001;

/// Default request body ceiling (10 KiB)
pub const DEFAULT_BODY_LIMIT_BYTES: usize = 10 * 1024;

/// Complete server configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Server bind address
    pub bind: SocketAddr,
    /// Allowed CORS origin, `*` for any
    pub cors_origin: String,
    /// Maximum request body size in bytes
    pub body_limit_bytes: usize,
    /// Engine configuration
    pub engine: EngineConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from((Ipv4Addr::LOCALHOST, DEFAULT_PORT)),
            cors_origin: "*".to_string(),
            body_limit_bytes: DEFAULT_BODY_LIMIT_BYTES,
            engine: EngineConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Arguments
    ///
    /// * `bind_override` - Optional bind address override (from CLI args)
    ///
    /// # Errors
    ///
    /// Returns error if `SERVER_BIND` or the engine settings are malformed
    pub fn from_env(bind_override: Option<SocketAddr>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        // Bind address: CLI flag, then SERVER_BIND, then PORT on localhost
        let bind = match bind_override {
            Some(bind) => bind,
            None => match std::env::var("SERVER_BIND") {
                Ok(value) => value.parse().map_err(|_| ConfigError::Invalid {
                    var: "SERVER_BIND".to_string(),
                    reason: format!("'{value}' is not an IP:PORT address"),
                })?,
                Err(_) => SocketAddr::from((
                    Ipv4Addr::LOCALHOST,
                    parse_env_or("PORT", DEFAULT_PORT),
                )),
            },
        };

        Ok(ServerConfig {
            bind,
            cors_origin: std::env::var("CORS_ORIGIN").unwrap_or(defaults.cors_origin),
            body_limit_bytes: parse_env_or("BODY_LIMIT_BYTES", defaults.body_limit_bytes),
            engine: EngineConfig::from_env()?,
        })
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.engine.validate()?;

        if self.body_limit_bytes == 0 {
            return Err(ConfigError::Invalid {
                var: "BODY_LIMIT_BYTES".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        if self.cors_origin != "*" && HeaderValue::from_str(&self.cors_origin).is_err() {
            return Err(ConfigError::Invalid {
                var: "CORS_ORIGIN".to_string(),
                reason: "Must be '*' or a valid origin header value".to_string(),
            });
        }

        Ok(())
    }
}
