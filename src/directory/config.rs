//! Configuration for directory refresh.

use serde::{Deserialize, Serialize};

/// How often and how patiently backend catalogs are polled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectoryConfig {
    /// Seconds between refresh cycles
    pub interval_seconds: u64,
    /// Timeout for each backend's catalog request
    pub timeout_seconds: u64,
    /// Largest catalog body read from one backend
    pub max_catalog_bytes: usize,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            interval_seconds: 60,
            timeout_seconds: 10,
            max_catalog_bytes: 8 * 1024 * 1024,
        }
    }
}
