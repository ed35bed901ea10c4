//! Request routing.
//!
//! [`route`] decides which backend serves a request and what path the
//! request gets on that backend. It works on a [`Directory`] snapshot, so a
//! refresh that completes mid-request cannot change a decision already made.

pub mod requirements;

pub use requirements::{requested_model, RequirementsError};

use crate::backend::{BackendRef, API_PREFIX};
use crate::directory::Directory;
use std::sync::Arc;

/// Why a backend was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteReason {
    /// The requested model is in the directory
    DirectoryMatch,
    /// No model requested, or the model is unknown
    DefaultBackend,
}

impl RouteReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            RouteReason::DirectoryMatch => "directory-match",
            RouteReason::DefaultBackend => "default-backend",
        }
    }
}

/// Routing decision for one request.
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    pub backend: Arc<BackendRef>,
    /// Inbound path rewritten onto the backend's prefix
    pub path: String,
    pub reason: RouteReason,
}

impl Route {
    /// Absolute upstream URL, with the inbound query string appended.
    pub fn target_url(&self, query: Option<&str>) -> String {
        match query {
            Some(q) if !q.is_empty() => format!("{}{}?{}", self.backend.origin, self.path, q),
            _ => format!("{}{}", self.backend.origin, self.path),
        }
    }
}

/// Select the backend for `requested_model` and rewrite `inbound_path`.
///
/// Unknown or absent models go to `default_backend`.
///
/// # Examples
///
/// ```
/// use modelgate::backend::resolve;
/// use modelgate::directory::Directory;
/// use modelgate::routing::{route, RouteReason};
/// use std::sync::Arc;
///
/// let default_backend = Arc::new(resolve("http://a:9000"));
/// let route = route(None, "/v1/chat/completions", &Directory::new(), &default_backend);
/// assert_eq!(route.reason, RouteReason::DefaultBackend);
/// assert_eq!(route.target_url(None), "http://a:9000/v1/chat/completions");
/// ```
pub fn route(
    requested_model: Option<&str>,
    inbound_path: &str,
    directory: &Directory,
    default_backend: &Arc<BackendRef>,
) -> Route {
    let (backend, reason) = match requested_model.and_then(|m| directory.lookup(m)) {
        Some(entry) => (Arc::clone(&entry.backend), RouteReason::DirectoryMatch),
        None => (Arc::clone(default_backend), RouteReason::DefaultBackend),
    };

    let path = rewrite_path(inbound_path, &backend.path_prefix);
    Route {
        backend,
        path,
        reason,
    }
}

/// Map an inbound path onto a backend prefix.
///
/// A path under [`API_PREFIX`] has that prefix replaced; anything else is
/// appended to the backend prefix.
pub fn rewrite_path(inbound_path: &str, backend_prefix: &str) -> String {
    match strip_api_prefix(inbound_path) {
        Some(rest) => format!("{}{}", backend_prefix, rest),
        None => format!("{}{}", backend_prefix, inbound_path),
    }
}

/// Remainder of `path` after [`API_PREFIX`], if it starts with the prefix on
/// a segment boundary (`/v1` or `/v1/...`, not `/v1beta`).
fn strip_api_prefix(path: &str) -> Option<&str> {
    let rest = path.strip_prefix(API_PREFIX)?;
    if rest.is_empty() || rest.starts_with('/') {
        Some(rest)
    } else {
        None
    }
}
