//! Models listing endpoint handler.

use crate::api::AppState;
use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;

/// Models list response in OpenAI format.
#[derive(Debug, Serialize)]
pub struct ModelsResponse {
    pub object: &'static str,
    /// Model objects exactly as their backends reported them
    pub data: Vec<serde_json::Value>,
}

/// GET /v1/models - List every model in the current directory snapshot.
///
/// Always succeeds; an empty or not yet populated directory yields an
/// empty list.
pub async fn handle(State(state): State<Arc<AppState>>) -> Json<ModelsResponse> {
    let snapshot = state.directory.snapshot();
    Json(ModelsResponse {
        object: "list",
        data: snapshot.catalog(),
    })
}
