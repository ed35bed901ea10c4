//! Health check endpoint handler.

use crate::api::AppState;
use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub uptime_seconds: u64,
    /// Configured backends
    pub backends: usize,
    /// Models in the current directory snapshot
    pub models: usize,
    /// Completion time of the last refresh cycle, if one has run
    pub last_refresh: Option<DateTime<Utc>>,
}

/// GET /health - Report liveness and the directory state.
///
/// The gateway stays "ok" while catalogs are empty: unknown models still
/// route to the default backend.
pub async fn handle(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let snapshot = state.directory.snapshot();

    Json(HealthResponse {
        status: "ok",
        uptime_seconds: state.metrics_collector.uptime_seconds(),
        backends: state.backends.len(),
        models: snapshot.len(),
        last_refresh: snapshot.refreshed_at(),
    })
}
