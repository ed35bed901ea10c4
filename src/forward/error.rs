//! Forwarding error types.

use axum::http::StatusCode;
use thiserror::Error;

/// Why a request could not be relayed to its backend.
///
/// Messages carry upstream detail for logs only; callers get a generic body.
#[derive(Debug, Clone, Error)]
pub enum ForwardError {
    /// Backend answered with a non-2xx status
    #[error("upstream returned {0}")]
    UpstreamStatus(StatusCode),

    /// No response headers within the request timeout
    #[error("no upstream response after {0}s")]
    Timeout(u64),

    /// Connection could not be established or was reset
    #[error("upstream unreachable: {0}")]
    Unreachable(String),
}

impl ForwardError {
    /// Short label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            ForwardError::UpstreamStatus(_) => "upstream_status",
            ForwardError::Timeout(_) => "timeout",
            ForwardError::Unreachable(_) => "unreachable",
        }
    }

    /// Status reported to the caller: the upstream status when there was
    /// one, 500 otherwise.
    pub fn status(&self) -> StatusCode {
        match self {
            ForwardError::UpstreamStatus(status) => *status,
            ForwardError::Timeout(_) | ForwardError::Unreachable(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_status_is_mirrored() {
        let err = ForwardError::UpstreamStatus(StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(err.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(err.kind(), "upstream_status");
    }

    #[test]
    fn test_transport_errors_map_to_500() {
        assert_eq!(
            ForwardError::Timeout(30).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ForwardError::Unreachable("refused".to_string()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(
            ForwardError::Timeout(30).to_string(),
            "no upstream response after 30s"
        );
    }
}
