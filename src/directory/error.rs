//! Error types for catalog fetching.

use thiserror::Error;

/// Why a backend's catalog could not be read during a refresh cycle.
#[derive(Debug, Clone, Error)]
pub enum CatalogError {
    /// Request timeout
    #[error("request timeout after {0}s")]
    Timeout(u64),

    /// Connection failed
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Non-2xx status
    #[error("HTTP error: {0}")]
    HttpError(u16),

    #[error("catalog larger than {0} bytes")]
    TooLarge(usize),

    /// Body was not a catalog
    #[error("invalid response: {0}")]
    ParseError(String),
}

impl CatalogError {
    /// Short label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            CatalogError::Timeout(_) => "timeout",
            CatalogError::ConnectionFailed(_) => "unreachable",
            CatalogError::HttpError(_) => "http_error",
            CatalogError::TooLarge(_) => "too_large",
            CatalogError::ParseError(_) => "bad_response",
        }
    }
}
