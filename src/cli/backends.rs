//! Backends command implementation

use crate::backend::BackendView;
use crate::cli::output::{format_backends_json, format_backends_table, BackendRow};
use crate::cli::{load_config, BackendsArgs};
use crate::config::GatewayConfig;

/// Handle backends command
pub fn handle_backends(args: &BackendsArgs) -> Result<String, Box<dyn std::error::Error>> {
    let config = load_config(&args.config)?;
    config.validate()?;

    let rows = backend_rows(&config);
    if args.json {
        Ok(format_backends_json(&rows)?)
    } else {
        Ok(format_backends_table(&rows))
    }
}

/// Resolved backends in route order; the first one is the default.
pub fn backend_rows(config: &GatewayConfig) -> Vec<BackendRow> {
    config
        .backend_refs()
        .iter()
        .enumerate()
        .map(|(i, backend)| BackendRow {
            backend: BackendView::from(backend.as_ref()),
            default: i == 0,
        })
        .collect()
}
