//! # Gateway HTTP API
//!
//! One OpenAI-compatible endpoint in front of every configured backend.
//!
//! ## Endpoints
//!
//! - `GET /v1/models` - Unified catalog from the current directory snapshot
//! - `<any> /v1/*` - Proxied to the backend serving the requested model
//! - `GET /health` - Liveness plus directory summary
//! - `GET /metrics` - Prometheus text format
//! - `GET /` - Banner
//!
//! ## Example
//!
//! ```no_run
//! use modelgate::api::{create_router, AppState};
//! use modelgate::config::GatewayConfig;
//! use modelgate::directory::ModelDirectory;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = GatewayConfig {
//!     backends: vec!["http://localhost:11434/v1".to_string()],
//!     ..Default::default()
//! };
//! let directory = Arc::new(ModelDirectory::new());
//! let state = Arc::new(AppState::new(Arc::new(config), directory)?);
//!
//! let app = create_router(state);
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! Errors use the OpenAI envelope with generic messages; causes are logged,
//! never returned:
//! ```json
//! { "error": { "message": "Error processing request", "type": "upstream_error", "code": "upstream_error" } }
//! ```

pub mod headers;
mod health;
mod models;
mod proxy;
pub mod types;

pub use health::HealthResponse;
pub use types::*;

use crate::auth::{self, AccessPolicy};
use crate::backend::{BackendRef, API_PREFIX};
use crate::config::{ConfigError, GatewayConfig};
use crate::directory::ModelDirectory;
use crate::forward::Forwarder;
use crate::metrics::MetricsCollector;
use axum::{
    body::Body,
    extract::{DefaultBodyLimit, State},
    handler::Handler,
    http::Request,
    middleware,
    response::{IntoResponse, Response},
    routing::{any, get},
    Router,
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Text served at `GET /`.
pub const BANNER: &str = "modelgate";

/// Shared application state accessible to all handlers.
pub struct AppState {
    pub config: Arc<GatewayConfig>,
    /// Live model directory, refreshed in the background
    pub directory: Arc<ModelDirectory>,
    /// Configured backends in priority order
    pub backends: Vec<Arc<BackendRef>>,
    /// First configured backend; target for unknown or absent models
    pub default_backend: Arc<BackendRef>,
    pub forwarder: Forwarder,
    pub access: Arc<dyn AccessPolicy>,
    /// Largest accepted request body in bytes
    pub payload_limit: usize,
    /// Server startup time for uptime tracking
    pub start_time: Instant,
    /// Metrics collector for observability
    pub metrics_collector: Arc<MetricsCollector>,
}

impl AppState {
    /// Create application state from a validated configuration.
    pub fn new(
        config: Arc<GatewayConfig>,
        directory: Arc<ModelDirectory>,
    ) -> Result<Self, ConfigError> {
        let forwarder = Forwarder::new(
            Duration::from_secs(config.server.connect_timeout_seconds),
            Duration::from_secs(config.server.request_timeout_seconds),
        )
        .map_err(|e| ConfigError::HttpClient(e.to_string()))?;

        Self::with_forwarder(config, directory, forwarder)
    }

    /// Create application state with a custom forwarder (for testing).
    pub fn with_forwarder(
        config: Arc<GatewayConfig>,
        directory: Arc<ModelDirectory>,
        forwarder: Forwarder,
    ) -> Result<Self, ConfigError> {
        let backends = config.backend_refs();
        let default_backend = backends
            .first()
            .cloned()
            .ok_or_else(|| ConfigError::validation("backends", "at least one backend is required"))?;

        let start_time = Instant::now();
        let metrics_collector = Arc::new(MetricsCollector::new(
            Arc::clone(&directory),
            backends.len(),
            start_time,
            crate::metrics::prometheus_handle(),
        ));

        Ok(Self {
            access: auth::policy_from_config(&config.auth),
            payload_limit: config.payload_limit_bytes(),
            config,
            directory,
            backends,
            default_backend,
            forwarder,
            start_time,
            metrics_collector,
        })
    }
}

/// Create the main API router with all endpoints configured.
pub fn create_router(state: Arc<AppState>) -> Router {
    let protected = Router::new()
        .route("/v1/models", get(models::handle).fallback(proxy::handle))
        .route("/v1", any(proxy::handle))
        .route("/v1/", any(proxy::handle))
        .route("/v1/*rest", any(proxy::handle))
        .route_layer(middleware::from_fn_with_state(
            Arc::clone(&state),
            auth::require_access,
        ));

    Router::new()
        .route("/", get(banner))
        .route("/health", get(health::handle))
        .route("/metrics", get(crate::metrics::handler::metrics_handler))
        .merge(protected)
        .fallback(fallback)
        .layer(DefaultBodyLimit::max(state.payload_limit))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn banner() -> &'static str {
    BANNER
}

/// Unmatched paths that still start with the API prefix (`/v1beta/...`)
/// are proxied; everything else is 404.
async fn fallback(State(state): State<Arc<AppState>>, request: Request<Body>) -> Response {
    if !request.uri().path().starts_with(API_PREFIX) {
        return ApiError::not_found().into_response();
    }
    if let Err(rejection) = auth::check_access(&state, &request) {
        return rejection;
    }
    proxy::handle.call(request, state).await
}
