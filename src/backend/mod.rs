//! Backend descriptors.
//!
//! Every configured backend is a specification string of the form `URL` or
//! `URL|CREDENTIAL`. [`resolve`] turns it into a [`BackendRef`], which stays
//! immutable for the lifetime of the process and is shared by reference
//! between the directory and the forwarder.

use reqwest::Url;
use serde::Serialize;
use std::fmt;

/// API prefix served by the gateway and assumed for backends that don't
/// declare one.
pub const API_PREFIX: &str = "/v1";

/// Origin used when a backend specification is not a valid absolute URL.
pub const LOCAL_ORIGIN: &str = "http://localhost";

/// Resolved reference to one configured backend.
///
/// # Examples
///
/// ```
/// use modelgate::backend::resolve;
///
/// let backend = resolve("https://api.example.com/openai/v1|sk-123");
/// assert_eq!(backend.origin, "https://api.example.com");
/// assert_eq!(backend.path_prefix, "/openai/v1");
/// assert_eq!(backend.credential.as_deref(), Some("sk-123"));
/// ```
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct BackendRef {
    /// Scheme, host and (non-default) port, without trailing slash
    pub origin: String,
    /// Path every request to this backend is rooted at (e.g. `/v1`)
    pub path_prefix: String,
    /// Bearer credential sent as `Authorization` to this backend
    pub credential: Option<String>,
}

impl BackendRef {
    /// Origin and path prefix, safe to log.
    pub fn display_name(&self) -> String {
        format!("{}{}", self.origin, self.path_prefix)
    }

    /// URL of the backend's catalog endpoint.
    pub fn models_url(&self) -> String {
        format!("{}{}/models", self.origin, self.path_prefix)
    }

    /// `Authorization` header value for this backend, if it has a credential.
    pub fn bearer(&self) -> Option<String> {
        self.credential.as_ref().map(|c| format!("Bearer {}", c))
    }
}

impl fmt::Debug for BackendRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendRef")
            .field("origin", &self.origin)
            .field("path_prefix", &self.path_prefix)
            .field("credential", &self.credential.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl fmt::Display for BackendRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_name())
    }
}

/// Serializable view of a backend without its credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BackendView {
    pub origin: String,
    pub path_prefix: String,
    pub has_credential: bool,
}

impl From<&BackendRef> for BackendView {
    fn from(backend: &BackendRef) -> Self {
        Self {
            origin: backend.origin.clone(),
            path_prefix: backend.path_prefix.clone(),
            has_credential: backend.credential.is_some(),
        }
    }
}

/// Resolve a backend specification string.
///
/// Never fails: anything that is not an absolute URL with a host is read as
/// a path on [`LOCAL_ORIGIN`] when it starts with `/`, otherwise it maps to
/// [`API_PREFIX`] on [`LOCAL_ORIGIN`].
pub fn resolve(spec: &str) -> BackendRef {
    let (url_part, credential) = match spec.split_once('|') {
        Some((url, cred)) => (url.trim(), Some(cred.trim())),
        None => (spec.trim(), None),
    };
    let credential = credential
        .filter(|c| !c.is_empty())
        .map(str::to_string);

    match Url::parse(url_part) {
        Ok(url) if url.has_host() => BackendRef {
            origin: url.origin().ascii_serialization(),
            path_prefix: normalize_prefix(url.path()),
            credential,
        },
        _ => {
            let path_prefix = if url_part.starts_with('/') {
                normalize_prefix(url_part)
            } else {
                API_PREFIX.to_string()
            };
            BackendRef {
                origin: LOCAL_ORIGIN.to_string(),
                path_prefix,
                credential,
            }
        }
    }
}

fn normalize_prefix(path: &str) -> String {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        API_PREFIX.to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_resolve_origin_only_uses_default_prefix() {
        let backend = resolve("http://a:9000");
        assert_eq!(backend.origin, "http://a:9000");
        assert_eq!(backend.path_prefix, "/v1");
        assert!(backend.credential.is_none());
    }

    #[test]
    fn test_resolve_root_path_uses_default_prefix() {
        let backend = resolve("http://a:9000/");
        assert_eq!(backend.path_prefix, API_PREFIX);
    }

    #[test]
    fn test_resolve_with_credential() {
        let backend = resolve("http://b:9000|secret");
        assert_eq!(backend.origin, "http://b:9000");
        assert_eq!(backend.path_prefix, "/v1");
        assert_eq!(backend.credential.as_deref(), Some("secret"));
    }

    #[test]
    fn test_resolve_splits_on_first_pipe_only() {
        let backend = resolve("http://b:9000/api|tok|en");
        assert_eq!(backend.path_prefix, "/api");
        assert_eq!(backend.credential.as_deref(), Some("tok|en"));
    }

    #[test]
    fn test_resolve_empty_credential_is_none() {
        let backend = resolve("http://b:9000|");
        assert!(backend.credential.is_none());
    }

    #[test]
    fn test_resolve_default_port_omitted_from_origin() {
        let backend = resolve("https://api.example.com:443/openai");
        assert_eq!(backend.origin, "https://api.example.com");
        assert_eq!(backend.path_prefix, "/openai");
    }

    #[test]
    fn test_resolve_trailing_slash_trimmed() {
        let backend = resolve("http://host/custom/v1/");
        assert_eq!(backend.path_prefix, "/custom/v1");
        assert_eq!(backend.models_url(), "http://host/custom/v1/models");
    }

    #[test]
    fn test_resolve_path_only_falls_back_to_local_origin() {
        let backend = resolve("/llm/v1");
        assert_eq!(backend.origin, LOCAL_ORIGIN);
        assert_eq!(backend.path_prefix, "/llm/v1");
    }

    #[test]
    fn test_resolve_path_only_keeps_credential() {
        let backend = resolve("/llm|key");
        assert_eq!(backend.origin, LOCAL_ORIGIN);
        assert_eq!(backend.path_prefix, "/llm");
        assert_eq!(backend.credential.as_deref(), Some("key"));
    }

    #[test]
    fn test_resolve_garbage_falls_back_to_default_prefix() {
        for spec in ["not a url", "", "::::", "localhost"] {
            let backend = resolve(spec);
            assert_eq!(backend.origin, LOCAL_ORIGIN, "spec {:?}", spec);
            assert_eq!(backend.path_prefix, API_PREFIX, "spec {:?}", spec);
        }
    }

    #[test]
    fn test_debug_redacts_credential() {
        let backend = resolve("http://b:9000|super-secret");
        let debug = format!("{:?}", backend);
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("<redacted>"));
        assert!(!backend.to_string().contains("super-secret"));
    }

    #[test]
    fn test_bearer_header_value() {
        assert_eq!(
            resolve("http://b|abc").bearer().as_deref(),
            Some("Bearer abc")
        );
        assert!(resolve("http://b").bearer().is_none());
    }

    #[test]
    fn test_backend_view_hides_credential() {
        let view = BackendView::from(&resolve("http://b:1|abc"));
        let json = serde_json::to_string(&view).unwrap();
        assert!(!json.contains("abc"));
        assert!(view.has_credential);
    }

    proptest! {
        #[test]
        fn prop_resolve_splits_url_path_and_token(
            scheme in prop::sample::select(vec!["http", "https"]),
            host in "[a-z][a-z0-9]{0,15}",
            path in "[a-z][a-z0-9_]{0,10}",
            token in "[A-Za-z0-9_\\-]{1,32}",
        ) {
            let backend = resolve(&format!("{}://{}/{}|{}", scheme, host, path, token));
            prop_assert_eq!(backend.origin, format!("{}://{}", scheme, host));
            prop_assert_eq!(backend.path_prefix, format!("/{}", path));
            prop_assert_eq!(backend.credential, Some(token));
        }

        #[test]
        fn prop_root_path_yields_default_prefix(
            host in "[a-z][a-z0-9]{0,15}",
            port in 1u16..65535,
        ) {
            let backend = resolve(&format!("http://{}:{}/", host, port));
            prop_assert_eq!(backend.path_prefix, API_PREFIX.to_string());
        }
    }
}
