//! Configuration module for modelgate
//!
//! Provides layered configuration loading from files, environment variables, and defaults.
//!
//! # Configuration Precedence
//!
//! 1. CLI arguments (highest priority)
//! 2. Environment variables (`MODELGATE_*`)
//! 3. Configuration file (TOML)
//! 4. Default values (lowest priority)
//!
//! # Example
//!
//! ```rust
//! use modelgate::config::GatewayConfig;
//!
//! let toml = r#"
//! backends = ["http://localhost:11434/v1", "https://api.example.com/v1|sk-test"]
//!
//! [server]
//! port = 9000
//! "#;
//! let config: GatewayConfig = toml::from_str(toml).unwrap();
//! assert_eq!(config.server.port, 9000);
//! assert!(config.validate().is_ok());
//! ```

pub mod auth;
pub mod error;
pub mod logging;
pub mod server;

pub use crate::directory::DirectoryConfig;
pub use auth::AuthConfig;
pub use error::ConfigError;
pub use logging::{LogFormat, LoggingConfig};
pub use server::{parse_size, ServerConfig};

use crate::backend::{self, BackendRef};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

/// Unified configuration for the gateway.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// HTTP server configuration
    pub server: ServerConfig,
    /// Catalog refresh settings
    pub directory: DirectoryConfig,
    /// Caller access control
    pub auth: AuthConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
    /// Backend specification strings (`URL` or `URL|CREDENTIAL`), in
    /// priority order. The first one is the default route.
    pub backends: Vec<String>,
}

impl GatewayConfig {
    /// Load configuration from a TOML file
    ///
    /// If path is None, returns default configuration.
    /// If path doesn't exist, returns NotFound error.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => {
                if !p.exists() {
                    return Err(ConfigError::NotFound(p.to_path_buf()));
                }
                let content = std::fs::read_to_string(p)?;
                toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
            }
            None => Ok(Self::default()),
        }
    }

    /// Apply environment variable overrides
    ///
    /// Supports MODELGATE_* environment variables for common settings.
    /// Invalid values are silently ignored (defaults are kept).
    pub fn with_env_overrides(mut self) -> Self {
        // Server settings
        if let Ok(port) = std::env::var("MODELGATE_PORT") {
            if let Ok(p) = port.parse() {
                self.server.port = p;
            }
        }
        if let Ok(host) = std::env::var("MODELGATE_HOST") {
            self.server.host = host;
        }
        if let Ok(limit) = std::env::var("MODELGATE_PAYLOAD_LIMIT") {
            if parse_size(&limit).is_some() {
                self.server.payload_limit = limit;
            }
        }

        // Backends and directory
        if let Ok(backends) = std::env::var("MODELGATE_BACKENDS") {
            let backends = split_list(&backends);
            if !backends.is_empty() {
                self.backends = backends;
            }
        }
        if let Ok(interval) = std::env::var("MODELGATE_REFRESH_INTERVAL") {
            if let Ok(i) = interval.parse() {
                self.directory.interval_seconds = i;
            }
        }

        if let Ok(tokens) = std::env::var("MODELGATE_ACCESS_TOKENS") {
            self.auth.access_tokens = split_list(&tokens);
        }

        // Logging settings
        if let Ok(level) = std::env::var("MODELGATE_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("MODELGATE_LOG_FORMAT") {
            if let Ok(f) = format.parse() {
                self.logging.format = f;
            }
        }

        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::validation(
                "server.port",
                "port must be non-zero",
            ));
        }
        if parse_size(&self.server.payload_limit).is_none() {
            return Err(ConfigError::validation(
                "server.payload_limit",
                "expected a size such as 1mb, 512kb or a byte count",
            ));
        }
        if self.server.request_timeout_seconds == 0 {
            return Err(ConfigError::validation(
                "server.request_timeout_seconds",
                "timeout must be non-zero",
            ));
        }
        if self.server.connect_timeout_seconds == 0 {
            return Err(ConfigError::validation(
                "server.connect_timeout_seconds",
                "timeout must be non-zero",
            ));
        }
        if self.directory.interval_seconds == 0 {
            return Err(ConfigError::validation(
                "directory.interval_seconds",
                "interval must be non-zero",
            ));
        }
        if self.directory.timeout_seconds == 0 {
            return Err(ConfigError::validation(
                "directory.timeout_seconds",
                "timeout must be non-zero",
            ));
        }
        if self.directory.max_catalog_bytes == 0 {
            return Err(ConfigError::validation(
                "directory.max_catalog_bytes",
                "limit must be non-zero",
            ));
        }
        if let Some((field, level)) = self.logging.invalid_level() {
            return Err(ConfigError::Validation {
                field,
                message: format!("unknown log level {:?}", level),
            });
        }

        if self.backends.is_empty() {
            return Err(ConfigError::validation(
                "backends",
                "at least one backend is required",
            ));
        }
        for (i, spec) in self.backends.iter().enumerate() {
            if spec.trim().is_empty() {
                return Err(ConfigError::Validation {
                    field: format!("backends[{}]", i),
                    message: "backend cannot be empty".to_string(),
                });
            }
        }

        Ok(())
    }

    /// Resolved backends in configured order.
    pub fn backend_refs(&self) -> Vec<Arc<BackendRef>> {
        self.backends
            .iter()
            .map(|spec| Arc::new(backend::resolve(spec)))
            .collect()
    }

    /// Payload limit in bytes, falling back to 1 MiB if unparseable.
    pub fn payload_limit_bytes(&self) -> usize {
        parse_size(&self.server.payload_limit).unwrap_or(1024 * 1024)
    }
}

/// Serializes tests that read or write `MODELGATE_*` variables.
#[cfg(test)]
pub(crate) static ENV_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());

/// Split a comma separated list, trimming entries and dropping empty ones.
fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
