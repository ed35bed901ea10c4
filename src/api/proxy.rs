//! Proxy handler for everything under `/v1`.

use crate::api::headers::apply_route_headers;
use crate::api::{ApiError, AppState};
use crate::logging::request_id_from_headers;
use crate::routing::{self, requested_model, RouteReason};
use axum::{
    extract::{rejection::BytesRejection, State},
    http::{HeaderMap, Method, Uri},
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use std::sync::Arc;
use tracing::{info, warn, Instrument};

/// `<any method> /v1/*` - Route by the body's `model` field and stream the
/// backend's response back.
pub async fn handle(
    State(state): State<Arc<AppState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let request_id = request_id_from_headers(&headers);
    let span = tracing::info_span!(
        "proxy",
        request_id = %request_id,
        method = %method,
        path = %uri.path(),
    );

    let (mut response, reason) = forward(&state, method, &uri, &headers, body)
        .instrument(span)
        .await;

    metrics::counter!(
        "modelgate_requests_total",
        "status" => response.status().as_u16().to_string()
    )
    .increment(1);

    apply_route_headers(response.headers_mut(), &request_id, reason);
    response
}

async fn forward(
    state: &AppState,
    method: Method,
    uri: &Uri,
    headers: &HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> (Response, Option<RouteReason>) {
    let body = match body {
        Ok(body) => body,
        Err(BytesRejection::FailedToBufferBody(
            axum::extract::rejection::FailedToBufferBody::LengthLimitError(_),
        )) => {
            warn!(limit = state.payload_limit, "Request body exceeds payload limit");
            return (ApiError::payload_too_large().into_response(), None);
        }
        Err(rejection) => {
            warn!(error = %rejection, "Failed to read request body");
            return (ApiError::bad_request().into_response(), None);
        }
    };

    let model = match requested_model(&body) {
        Ok(model) => model,
        Err(e) => {
            warn!(error = %e, "Rejected request body");
            return (ApiError::bad_request().into_response(), None);
        }
    };

    let snapshot = state.directory.snapshot();
    let route = routing::route(
        model.as_deref(),
        uri.path(),
        &snapshot,
        &state.default_backend,
    );

    info!(
        model = model.as_deref().unwrap_or("-"),
        backend = %route.backend,
        path = %route.path,
        reason = route.reason.as_str(),
        "Forwarding request"
    );

    let result = state
        .forwarder
        .forward(method, headers, body, &route, uri.query())
        .await;

    match result {
        Ok(response) => (response, Some(route.reason)),
        Err(e) => {
            warn!(backend = %route.backend, error = %e, "Forwarding failed");
            metrics::counter!("modelgate_forward_errors_total", "kind" => e.kind()).increment(1);
            (ApiError::from(e).into_response(), Some(route.reason))
        }
    }
}
