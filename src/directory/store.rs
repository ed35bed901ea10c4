//! Directory snapshot types and the swappable holder they live in.

use crate::backend::BackendRef;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock};

/// Lookup key of a model: hex SHA-256 of the model id.
///
/// Keys are fixed-length and made of `[0-9a-f]` only, so they stay usable in
/// paths and log fields no matter what characters a backend puts in its ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ModelKey(String);

impl ModelKey {
    pub fn for_model(model_id: &str) -> Self {
        Self(hex::encode(Sha256::digest(model_id.as_bytes())))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ModelKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One model as reported by a backend's catalog endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelRecord {
    pub id: String,
    pub object: String,
    pub owned_by: String,
    /// The backend's JSON object for this model, returned as-is by the catalog
    #[serde(skip)]
    pub raw: serde_json::Value,
}

impl ModelRecord {
    /// Record with no metadata beyond its id.
    pub fn new(id: impl Into<String>, owned_by: impl Into<String>) -> Self {
        let id = id.into();
        let owned_by = owned_by.into();
        let raw = serde_json::json!({
            "id": id,
            "object": "model",
            "owned_by": owned_by,
        });
        Self {
            id,
            object: "model".to_string(),
            owned_by,
            raw,
        }
    }
}

/// A model and the backend that serves it.
#[derive(Debug, Clone, PartialEq)]
pub struct DirectoryEntry {
    pub key: ModelKey,
    pub backend: Arc<BackendRef>,
    pub model: ModelRecord,
}

/// Result of one complete refresh cycle.
///
/// A `Directory` is never mutated after it has been published; the next
/// cycle builds a new one.
#[derive(Debug, Clone, Default)]
pub struct Directory {
    entries: HashMap<ModelKey, DirectoryEntry>,
    refreshed_at: Option<DateTime<Utc>>,
}

impl Directory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a model, replacing any entry with the same id.
    ///
    /// Returns the replaced entry. Refresh cycles insert backends in
    /// configured order, so the later backend wins.
    pub fn insert(&mut self, backend: Arc<BackendRef>, model: ModelRecord) -> Option<DirectoryEntry> {
        let key = ModelKey::for_model(&model.id);
        self.entries.insert(
            key.clone(),
            DirectoryEntry {
                key,
                backend,
                model,
            },
        )
    }

    pub fn get(&self, key: &ModelKey) -> Option<&DirectoryEntry> {
        self.entries.get(key)
    }

    /// Look up the entry for a model id.
    pub fn lookup(&self, model_id: &str) -> Option<&DirectoryEntry> {
        self.entries.get(&ModelKey::for_model(model_id))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries ordered by model id.
    pub fn entries(&self) -> Vec<&DirectoryEntry> {
        let mut entries: Vec<_> = self.entries.values().collect();
        entries.sort_by(|a, b| a.model.id.cmp(&b.model.id));
        entries
    }

    /// Raw model objects ordered by model id, as served by `GET /v1/models`.
    pub fn catalog(&self) -> Vec<serde_json::Value> {
        self.entries()
            .into_iter()
            .map(|entry| entry.model.raw.clone())
            .collect()
    }

    pub fn refreshed_at(&self) -> Option<DateTime<Utc>> {
        self.refreshed_at
    }

    pub fn with_refreshed_at(mut self, at: DateTime<Utc>) -> Self {
        self.refreshed_at = Some(at);
        self
    }
}

/// Shared holder of the current [`Directory`].
///
/// Writers replace the whole snapshot; readers clone the `Arc` and keep
/// using that snapshot for as long as they need it. The lock is only held
/// for the clone or the swap, never across an await point.
#[derive(Debug, Default)]
pub struct ModelDirectory {
    current: RwLock<Arc<Directory>>,
}

impl ModelDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current snapshot.
    pub fn snapshot(&self) -> Arc<Directory> {
        self.current
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Replace the current snapshot, returning the previous one.
    pub fn publish(&self, directory: Directory) -> Arc<Directory> {
        let next = Arc::new(directory);
        let mut current = self.current.write().unwrap_or_else(|e| e.into_inner());
        std::mem::replace(&mut *current, next)
    }
}
