//! Models command implementation

use crate::cli::output::{format_models_json, format_models_table, ModelView};
use crate::cli::{load_config, ModelsArgs};
use crate::config::GatewayConfig;
use crate::directory::{DirectoryRefresher, ModelDirectory};
use std::sync::Arc;

/// Handle models command: run one refresh cycle and render the result.
pub async fn handle_models(args: &ModelsArgs) -> Result<String, Box<dyn std::error::Error>> {
    let config = load_config(&args.config)?;
    config.validate()?;
    list_models(&config, args.json).await
}

/// Fetch every configured catalog once and format the merged directory.
pub async fn list_models(
    config: &GatewayConfig,
    json: bool,
) -> Result<String, Box<dyn std::error::Error>> {
    let refresher = DirectoryRefresher::new(
        config.backend_refs(),
        Arc::new(ModelDirectory::new()),
        config.directory.clone(),
    )?;
    let directory = refresher.refresh_once().await;
    let models = ModelView::from_directory(&directory);

    if json {
        Ok(format_models_json(&models)?)
    } else {
        Ok(format_models_table(&models))
    }
}
