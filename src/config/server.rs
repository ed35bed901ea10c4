//! Server configuration

use serde::{Deserialize, Serialize};

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Largest accepted request body, e.g. `1mb`, `512kb` or a byte count
    pub payload_limit: String,
    /// Upper bound on the wait for upstream response headers
    pub request_timeout_seconds: u64,
    pub connect_timeout_seconds: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            payload_limit: "1mb".to_string(),
            request_timeout_seconds: 300,
            connect_timeout_seconds: 10,
        }
    }
}

/// Parse a human-readable size (`1mb`, `512kb`, `2048`) into bytes.
///
/// Units are binary (`1kb` = 1024 bytes) and case-insensitive.
pub fn parse_size(value: &str) -> Option<usize> {
    let value = value.trim().to_lowercase();
    let split = value
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(value.len());
    let (number, unit) = value.split_at(split);

    let multiplier: f64 = match unit.trim() {
        "" | "b" => 1.0,
        "kb" => 1024.0,
        "mb" => 1024.0 * 1024.0,
        "gb" => 1024.0 * 1024.0 * 1024.0,
        _ => return None,
    };

    let number: f64 = number.parse().ok()?;
    let bytes = (number * multiplier).floor();
    if !bytes.is_finite() || bytes < 1.0 || bytes > usize::MAX as f64 {
        return None;
    }
    Some(bytes as usize)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_config_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 8080);
        assert_eq!(config.payload_limit, "1mb");
        assert_eq!(config.request_timeout_seconds, 300);
        assert_eq!(config.connect_timeout_seconds, 10);
    }

    #[test]
    fn test_parse_size_units() {
        assert_eq!(parse_size("1mb"), Some(1024 * 1024));
        assert_eq!(parse_size("512kb"), Some(512 * 1024));
        assert_eq!(parse_size("2048"), Some(2048));
        assert_eq!(parse_size("100b"), Some(100));
        assert_eq!(parse_size("1GB"), Some(1024 * 1024 * 1024));
        assert_eq!(parse_size(" 1.5 mb "), Some(1024 * 1024 * 3 / 2));
    }

    #[test]
    fn test_parse_size_invalid() {
        assert_eq!(parse_size(""), None);
        assert_eq!(parse_size("mb"), None);
        assert_eq!(parse_size("10tb"), None);
        assert_eq!(parse_size("0"), None);
        assert_eq!(parse_size("-1mb"), None);
    }
}
