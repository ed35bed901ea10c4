//! Error envelope returned by the gateway.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

/// OpenAI-compatible error response.
///
/// Messages are deliberately generic; the cause is only logged.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiError {
    pub error: ApiErrorBody,
    #[serde(skip, default = "internal_status")]
    status: StatusCode,
}

/// Error details.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiErrorBody {
    pub message: String,
    pub r#type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub param: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

fn internal_status() -> StatusCode {
    StatusCode::INTERNAL_SERVER_ERROR
}

impl ApiError {
    fn new(status: StatusCode, message: &str, r#type: &str, code: &str) -> Self {
        Self {
            error: ApiErrorBody {
                message: message.to_string(),
                r#type: r#type.to_string(),
                param: None,
                code: Some(code.to_string()),
            },
            status,
        }
    }

    /// Malformed inbound request (400).
    pub fn bad_request() -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            "Invalid request body",
            "invalid_request_error",
            "invalid_request_error",
        )
    }

    /// Request body above the configured payload limit (413).
    pub fn payload_too_large() -> Self {
        Self::new(
            StatusCode::PAYLOAD_TOO_LARGE,
            "Invalid request body",
            "invalid_request_error",
            "payload_too_large",
        )
    }

    /// Rejected by the access policy (401).
    pub fn unauthorized() -> Self {
        Self::new(
            StatusCode::UNAUTHORIZED,
            "Unauthorized",
            "authentication_error",
            "unauthorized",
        )
    }

    /// No such route (404).
    pub fn not_found() -> Self {
        Self::new(
            StatusCode::NOT_FOUND,
            "Not Found",
            "invalid_request_error",
            "not_found",
        )
    }

    /// Backend answered with a non-2xx `status`, mirrored to the caller.
    pub fn upstream(status: StatusCode) -> Self {
        Self::new(status, "Error processing request", "upstream_error", "upstream_error")
    }

    /// Backend could not be reached or did not answer (500).
    pub fn internal() -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal Server Error",
            "server_error",
            "internal_error",
        )
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        self.status
    }
}

impl From<crate::forward::ForwardError> for ApiError {
    fn from(err: crate::forward::ForwardError) -> Self {
        use crate::forward::ForwardError;
        match err {
            ForwardError::UpstreamStatus(status) => ApiError::upstream(status),
            ForwardError::Timeout(_) | ForwardError::Unreachable(_) => ApiError::internal(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}
