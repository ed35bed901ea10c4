//! Output formatting helpers for CLI commands

use crate::backend::BackendView;
use crate::directory::Directory;
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Cell, ContentArrangement, Table};
use serde_json::json;

/// Backend row: the credential-free view plus its position in the route order
#[derive(Debug, Clone, serde::Serialize)]
pub struct BackendRow {
    #[serde(flatten)]
    pub backend: BackendView,
    /// Target for requests whose model is not in the directory
    pub default: bool,
}

/// Model row: which backend won the id in the current directory
#[derive(Debug, Clone, serde::Serialize)]
pub struct ModelView {
    pub id: String,
    pub owned_by: String,
    pub backend: String,
    pub key: String,
}

impl ModelView {
    /// One row per directory entry, sorted by model id.
    pub fn from_directory(directory: &Directory) -> Vec<Self> {
        directory
            .entries()
            .into_iter()
            .map(|entry| Self {
                id: entry.model.id.clone(),
                owned_by: entry.model.owned_by.clone(),
                backend: entry.backend.display_name(),
                key: entry.key.to_string(),
            })
            .collect()
    }
}

/// Format backends as a table
pub fn format_backends_table(backends: &[BackendRow]) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["#", "Origin", "Path Prefix", "Credential", "Default"]);

    for (i, row) in backends.iter().enumerate() {
        let credential = if row.backend.has_credential {
            "set".green().to_string()
        } else {
            "not set".dimmed().to_string()
        };
        let default = if row.default {
            "✓".green().to_string()
        } else {
            String::new()
        };

        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(&row.backend.origin),
            Cell::new(&row.backend.path_prefix),
            Cell::new(credential),
            Cell::new(default),
        ]);
    }

    table.to_string()
}

/// Format backends as JSON
pub fn format_backends_json(backends: &[BackendRow]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&json!({
        "backends": backends
    }))
}

/// Format models as a table
pub fn format_models_table(models: &[ModelView]) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Model", "Owned By", "Backend"]);

    for m in models {
        table.add_row(vec![
            Cell::new(&m.id),
            Cell::new(&m.owned_by),
            Cell::new(m.backend.cyan().to_string()),
        ]);
    }

    table.to_string()
}

/// Format models as JSON
pub fn format_models_json(models: &[ModelView]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&json!({
        "models": models
    }))
}
