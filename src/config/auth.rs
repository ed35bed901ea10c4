//! Access control configuration

use serde::{Deserialize, Serialize};

/// Tokens callers must present. Empty means the gateway is open.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub access_tokens: Vec<String>,
}

impl AuthConfig {
    pub fn is_open(&self) -> bool {
        self.access_tokens.is_empty()
    }
}
