//! Shared test utilities for modelgate integration tests.
//!
//! Builders for configs, routers and mock backends so each test only spells
//! out what it is checking.

#![allow(dead_code)]

use axum::body::Body;
use modelgate::api::{create_router, AppState};
use modelgate::config::GatewayConfig;
use modelgate::directory::{DirectoryConfig, DirectoryRefresher, ModelDirectory};
use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// =============================================================================
// Well-Known Test Constants
// =============================================================================

/// UUID v4 string length: "xxxxxxxx-xxxx-xxxx-xxxx-xxxxxxxxxxxx"
pub const UUID_V4_STRING_LEN: usize = 36;

// =============================================================================
// Config and App Builders
// =============================================================================

/// Gateway config with the given backend specs and short timeouts.
pub fn make_config(backends: &[String]) -> GatewayConfig {
    let mut config = GatewayConfig {
        backends: backends.to_vec(),
        ..Default::default()
    };
    config.server.request_timeout_seconds = 5;
    config.server.connect_timeout_seconds = 2;
    config.directory = DirectoryConfig {
        interval_seconds: 60,
        timeout_seconds: 2,
        ..Default::default()
    };
    config
}

/// Router and state over an empty directory.
pub fn make_app(config: GatewayConfig) -> (axum::Router, Arc<AppState>) {
    let directory = Arc::new(ModelDirectory::new());
    let state = Arc::new(AppState::new(Arc::new(config), directory).unwrap());
    let app = create_router(Arc::clone(&state));
    (app, state)
}

/// Router and state after one completed refresh cycle.
pub async fn make_app_refreshed(config: GatewayConfig) -> (axum::Router, Arc<AppState>) {
    let (app, state) = make_app(config);
    refresh(&state).await;
    (app, state)
}

/// Run one refresh cycle against the state's backends and publish it.
pub async fn refresh(state: &Arc<AppState>) {
    let refresher = DirectoryRefresher::new(
        state.backends.clone(),
        Arc::clone(&state.directory),
        state.config.directory.clone(),
    )
    .unwrap();
    refresher.refresh().await;
}

// =============================================================================
// Mock Backends
// =============================================================================

/// Catalog body listing `ids`, owned by `owner`.
pub fn catalog_body(ids: &[&str], owner: &str) -> serde_json::Value {
    let data: Vec<_> = ids
        .iter()
        .map(|id| json!({"id": id, "object": "model", "owned_by": owner, "permission": []}))
        .collect();
    json!({"object": "list", "data": data})
}

/// Mount `GET {prefix}/models` on `server` listing `ids`.
pub async fn mount_catalog(server: &MockServer, prefix: &str, ids: &[&str], owner: &str) {
    Mock::given(method("GET"))
        .and(path(format!("{}/models", prefix)))
        .respond_with(ResponseTemplate::new(200).set_body_json(catalog_body(ids, owner)))
        .mount(server)
        .await;
}

// =============================================================================
// Body Helpers
// =============================================================================

/// Read a whole response body as a string.
pub async fn body_to_string(body: Body) -> String {
    use futures::StreamExt;
    let mut body_stream = body.into_data_stream();
    let mut result = String::new();
    while let Some(chunk) = body_stream.next().await {
        if let Ok(bytes) = chunk {
            result.push_str(&String::from_utf8_lossy(&bytes));
        }
    }
    result
}

/// Read a whole response body as JSON.
pub async fn body_to_json(body: Body) -> serde_json::Value {
    let text = body_to_string(body).await;
    serde_json::from_str(&text).unwrap_or_else(|e| panic!("invalid JSON {:?}: {}", text, e))
}
