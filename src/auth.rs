//! Caller admission.
//!
//! An [`AccessPolicy`] decides whether a request may reach the catalog and
//! proxy routes. It sees only the request headers and runs before any body
//! is read.

use crate::api::{ApiError, AppState};
use crate::config::AuthConfig;
use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

/// Predicate applied to every protected request.
pub trait AccessPolicy: Send + Sync {
    fn admit(&self, headers: &HeaderMap) -> bool;
}

/// Admits every request.
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenAccess;

impl AccessPolicy for OpenAccess {
    fn admit(&self, _headers: &HeaderMap) -> bool {
        true
    }
}

/// Admits requests presenting one of a fixed set of tokens, either as
/// `Authorization: Bearer <token>` or as `x-api-key`.
pub struct BearerTokens {
    tokens: Vec<String>,
}

impl BearerTokens {
    pub fn new(tokens: Vec<String>) -> Self {
        Self { tokens }
    }
}

impl std::fmt::Debug for BearerTokens {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BearerTokens")
            .field("tokens", &self.tokens.len())
            .finish()
    }
}

impl AccessPolicy for BearerTokens {
    fn admit(&self, headers: &HeaderMap) -> bool {
        match presented_token(headers) {
            Some(token) => self.tokens.iter().any(|t| constant_time_eq(t, token)),
            None => false,
        }
    }
}

/// Build the policy described by `config`.
pub fn policy_from_config(config: &AuthConfig) -> Arc<dyn AccessPolicy> {
    if config.is_open() {
        Arc::new(OpenAccess)
    } else {
        Arc::new(BearerTokens::new(config.access_tokens.clone()))
    }
}

/// Token from `Authorization: Bearer` or, failing that, `x-api-key`.
fn presented_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .or_else(|| headers.get("x-api-key").and_then(|v| v.to_str().ok()))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

fn constant_time_eq(a: &str, b: &str) -> bool {
    use subtle::ConstantTimeEq;
    if a.len() != b.len() {
        return false;
    }
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

/// Middleware rejecting requests the configured policy does not admit.
pub async fn require_access(
    State(state): State<Arc<AppState>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    match check_access(&state, &request) {
        Ok(()) => next.run(request).await,
        Err(rejection) => rejection,
    }
}

/// Apply the access policy outside the middleware stack (the proxy fallback
/// is not covered by `route_layer`).
pub fn check_access(state: &AppState, request: &Request<Body>) -> Result<(), Response> {
    if state.access.admit(request.headers()) {
        return Ok(());
    }

    tracing::debug!(
        method = %request.method(),
        path = %request.uri().path(),
        "Request rejected by access policy"
    );
    metrics::counter!("modelgate_requests_total", "status" => "401").increment(1);
    Err(ApiError::unauthorized().into_response())
}
