//! Catalog response parsing.

use super::error::CatalogError;
use super::store::ModelRecord;
use serde::Deserialize;

/// OpenAI-style `/models` response. Only `data` matters.
#[derive(Deserialize)]
struct CatalogResponse {
    #[serde(default)]
    data: Option<Vec<serde_json::Value>>,
}

/// Parse a backend's `/models` body into model records.
///
/// A missing or null `data` field is an empty catalog. Entries without a
/// string `id` are skipped.
pub fn parse_catalog(body: &[u8]) -> Result<Vec<ModelRecord>, CatalogError> {
    let response: CatalogResponse =
        serde_json::from_slice(body).map_err(|e| CatalogError::ParseError(e.to_string()))?;

    Ok(response
        .data
        .unwrap_or_default()
        .into_iter()
        .filter_map(|raw| {
            let Some(id) = raw.get("id").and_then(|v| v.as_str()).map(str::to_string) else {
                tracing::warn!(entry = %raw, "Skipping catalog entry without an id");
                return None;
            };
            let object = raw
                .get("object")
                .and_then(|v| v.as_str())
                .unwrap_or("model")
                .to_string();
            let owned_by = raw
                .get("owned_by")
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string();
            Some(ModelRecord {
                id,
                object,
                owned_by,
                raw,
            })
        })
        .collect())
}
