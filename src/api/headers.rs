//! X-Modelgate-* response headers for routing transparency.
//!
//! Added to every proxied response, successful or not, without touching
//! the body.

use crate::logging::REQUEST_ID_HEADER;
use crate::routing::RouteReason;
use axum::http::{HeaderMap, HeaderName, HeaderValue};

/// Why the request went where it went (`directory-match` or `default-backend`).
pub const HEADER_ROUTE_REASON: &str = "x-modelgate-route-reason";

/// Set the request id and, once a route was chosen, the route reason.
pub fn apply_route_headers(headers: &mut HeaderMap, request_id: &str, reason: Option<RouteReason>) {
    if let Ok(value) = HeaderValue::from_str(request_id) {
        headers.insert(HeaderName::from_static(REQUEST_ID_HEADER), value);
    }
    if let Some(reason) = reason {
        headers.insert(
            HeaderName::from_static(HEADER_ROUTE_REASON),
            HeaderValue::from_static(reason.as_str()),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_route_headers() {
        let mut headers = HeaderMap::new();
        apply_route_headers(&mut headers, "req-1", Some(RouteReason::DirectoryMatch));
        assert_eq!(headers.get("x-request-id").unwrap(), "req-1");
        assert_eq!(headers.get(HEADER_ROUTE_REASON).unwrap(), "directory-match");
    }

    #[test]
    fn test_apply_route_headers_without_route() {
        let mut headers = HeaderMap::new();
        apply_route_headers(&mut headers, "req-2", None);
        assert_eq!(headers.get("x-request-id").unwrap(), "req-2");
        assert!(headers.get(HEADER_ROUTE_REASON).is_none());
    }
}
