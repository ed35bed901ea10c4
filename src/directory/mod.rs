//! Model directory.
//!
//! Keeps the mapping from model id to the backend that serves it. A
//! background [`DirectoryRefresher`] polls every backend's catalog endpoint,
//! builds a complete new [`Directory`] per cycle and publishes it into the
//! shared [`ModelDirectory`] in one swap. The refresh interval is the pause
//! between the end of one cycle and the start of the next.

mod config;
mod error;
mod parser;
mod store;


pub use config::*;
pub use error::*;
pub use parser::parse_catalog;
pub use store::*;

use crate::backend::BackendRef;
use futures::future::join_all;
use futures::StreamExt;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

const JSON_CONTENT_TYPE: &str = "application/json";

/// Background service that rebuilds the directory from backend catalogs.
pub struct DirectoryRefresher {
    /// Backends in configured order; later ones win duplicate model ids
    backends: Vec<Arc<BackendRef>>,
    /// Where each completed cycle is published
    directory: Arc<ModelDirectory>,
    /// HTTP client with connection pooling
    client: reqwest::Client,
    config: DirectoryConfig,
}

impl DirectoryRefresher {
    /// Create a refresher with its own HTTP client.
    pub fn new(
        backends: Vec<Arc<BackendRef>>,
        directory: Arc<ModelDirectory>,
        config: DirectoryConfig,
    ) -> reqwest::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self::with_client(backends, directory, config, client))
    }

    /// Create a refresher with a custom HTTP client (for testing).
    pub fn with_client(
        backends: Vec<Arc<BackendRef>>,
        directory: Arc<ModelDirectory>,
        config: DirectoryConfig,
        client: reqwest::Client,
    ) -> Self {
        Self {
            backends,
            directory,
            client,
            config,
        }
    }

    pub fn backends(&self) -> &[Arc<BackendRef>] {
        &self.backends
    }

    /// Fetch and parse one backend's catalog.
    pub async fn fetch_catalog(&self, backend: &BackendRef) -> Result<Vec<ModelRecord>, CatalogError> {
        let mut request = self
            .client
            .get(backend.models_url())
            .header(ACCEPT, JSON_CONTENT_TYPE)
            .header(CONTENT_TYPE, JSON_CONTENT_TYPE)
            .timeout(Duration::from_secs(self.config.timeout_seconds));

        if let Some(bearer) = backend.bearer() {
            request = request.header(AUTHORIZATION, bearer);
        }

        let response = request
            .send()
            .await
            .map_err(|e| Self::classify_error(e, self.config.timeout_seconds))?;

        if !response.status().is_success() {
            return Err(CatalogError::HttpError(response.status().as_u16()));
        }

        let limit = self.config.max_catalog_bytes;
        if response.content_length().is_some_and(|len| len > limit as u64) {
            return Err(CatalogError::TooLarge(limit));
        }

        let mut body = Vec::new();
        let mut chunks = response.bytes_stream();
        while let Some(chunk) = chunks.next().await {
            let chunk = chunk.map_err(|e| Self::classify_error(e, self.config.timeout_seconds))?;
            if body.len() + chunk.len() > limit {
                return Err(CatalogError::TooLarge(limit));
            }
            body.extend_from_slice(&chunk);
        }

        parse_catalog(&body)
    }

    /// Classify reqwest error into CatalogError.
    fn classify_error(e: reqwest::Error, timeout_seconds: u64) -> CatalogError {
        if e.is_timeout() {
            CatalogError::Timeout(timeout_seconds)
        } else if e.is_decode() || e.is_body() {
            CatalogError::ParseError(e.to_string())
        } else {
            CatalogError::ConnectionFailed(e.to_string())
        }
    }

    /// Run one refresh cycle and return the directory it produced.
    ///
    /// Catalog requests run concurrently, but results are applied in
    /// configured order so duplicate ids always resolve to the last
    /// backend. A failing backend is logged and left out of the result.
    pub async fn refresh_once(&self) -> Directory {
        let results = join_all(self.backends.iter().map(|b| self.fetch_catalog(b))).await;

        let mut directory = Directory::new();
        let mut failed = 0usize;
        for (backend, result) in self.backends.iter().zip(results) {
            match result {
                Ok(models) => {
                    tracing::debug!(
                        backend = %backend,
                        models = ?models.iter().map(|m| m.id.as_str()).collect::<Vec<_>>(),
                        "Catalog fetched"
                    );
                    metrics::counter!("modelgate_catalog_refresh_total", "status" => "ok")
                        .increment(1);

                    for model in models {
                        if let Some(replaced) = directory.insert(Arc::clone(backend), model) {
                            if replaced.backend != *backend {
                                tracing::debug!(
                                    model = %replaced.model.id,
                                    from = %replaced.backend,
                                    to = %backend,
                                    "Model reported by several backends, later backend wins"
                                );
                            }
                        }
                    }
                }
                Err(error) => {
                    failed += 1;
                    tracing::warn!(
                        backend = %backend,
                        error = %error,
                        "Catalog fetch failed, backend skipped for this cycle"
                    );
                    metrics::counter!("modelgate_catalog_refresh_total", "status" => error.kind())
                        .increment(1);
                }
            }
        }

        tracing::info!(
            ok = self.backends.len() - failed,
            failed,
            models = directory.len(),
            "Catalog refresh cycle complete"
        );

        directory.with_refreshed_at(chrono::Utc::now())
    }

    /// Run one cycle and publish its result.
    pub async fn refresh(&self) -> Arc<Directory> {
        let directory = self.refresh_once().await;
        let models = directory.len();
        self.directory.publish(directory);
        metrics::gauge!("modelgate_directory_models").set(models as f64);

        tracing::debug!(models, "Directory published");
        self.directory.snapshot()
    }

    /// Start the refresh loop. The first cycle runs immediately; each later
    /// one starts `interval_seconds` after the previous one finished.
    ///
    /// Returns a JoinHandle that resolves once `cancel_token` is cancelled.
    pub fn start(self, cancel_token: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(async move {
            let interval = Duration::from_secs(self.config.interval_seconds);

            tracing::info!(
                interval_seconds = self.config.interval_seconds,
                backends = self.backends.len(),
                "Directory refresher started"
            );

            loop {
                tokio::select! {
                    _ = cancel_token.cancelled() => {
                        tracing::info!("Directory refresher shutting down mid-cycle");
                        break;
                    }
                    _ = self.refresh() => {}
                }

                tokio::select! {
                    _ = cancel_token.cancelled() => {
                        tracing::info!("Directory refresher shutting down");
                        break;
                    }
                    _ = tokio::time::sleep(interval) => {}
                }
            }
        })
    }
}
