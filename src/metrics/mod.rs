//! # Metrics Collection Module
//!
//! Prometheus export for the gateway, rendered at `GET /metrics`.
//!
//! ## Metrics Tracked
//!
//! **Counters:**
//! - `modelgate_requests_total{status}` - Proxied requests by response status
//! - `modelgate_forward_errors_total{kind}` - Forwarding failures by kind
//! - `modelgate_catalog_refresh_total{status}` - Catalog fetches per backend (`ok` or the failure kind)
//! - `modelgate_caller_disconnects_total` - Streams abandoned by the caller
//!
//! **Histograms:**
//! - `modelgate_upstream_header_seconds` - Time until upstream response headers
//!
//! **Gauges:**
//! - `modelgate_directory_models` - Models in the current directory snapshot
//! - `modelgate_backends_total` - Configured backends

pub mod handler;

use crate::directory::ModelDirectory;
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use std::sync::{Arc, OnceLock};
use std::time::Instant;

/// Renders gateway metrics and derives gauges from live state.
pub struct MetricsCollector {
    directory: Arc<ModelDirectory>,
    backend_count: usize,
    /// Gateway startup time for uptime calculation
    start_time: Instant,
    prometheus_handle: PrometheusHandle,
}

impl MetricsCollector {
    pub fn new(
        directory: Arc<ModelDirectory>,
        backend_count: usize,
        start_time: Instant,
        prometheus_handle: PrometheusHandle,
    ) -> Self {
        Self {
            directory,
            backend_count,
            start_time,
            prometheus_handle,
        }
    }

    /// Refresh gauges from the current directory snapshot.
    pub fn update_gauges(&self) {
        metrics::gauge!("modelgate_backends_total").set(self.backend_count as f64);
        metrics::gauge!("modelgate_directory_models").set(self.directory.snapshot().len() as f64);
    }

    /// Get uptime in seconds since gateway startup.
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Render Prometheus metrics in text format.
    pub fn render_metrics(&self) -> String {
        self.prometheus_handle.render()
    }
}

/// Initialize Prometheus metrics exporter with custom histogram buckets.
///
/// Buckets are sized for the time until an LLM backend starts answering
/// (seconds): [0.05, 0.1, 0.25, 0.5, 1, 2.5, 5, 10, 30, 60, 120, 300].
pub fn setup_metrics() -> Result<PrometheusHandle, Box<dyn std::error::Error>> {
    let header_buckets = &[
        0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0, 120.0, 300.0,
    ];

    let handle = PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full("modelgate_upstream_header_seconds".to_string()),
            header_buckets,
        )?
        .install_recorder()?;

    Ok(handle)
}

/// Process-wide Prometheus handle.
///
/// The global recorder can only be installed once; later callers (for
/// example several routers built in one test binary) share the same handle.
pub fn prometheus_handle() -> PrometheusHandle {
    static HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();
    HANDLE
        .get_or_init(|| {
            setup_metrics().unwrap_or_else(|e| {
                tracing::debug!(error = %e, "Metrics recorder already installed, using detached handle");
                PrometheusBuilder::new().build_recorder().handle()
            })
        })
        .clone()
}
