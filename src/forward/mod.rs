//! Streaming forwarder.
//!
//! Reissues an inbound request against the routed backend and relays the
//! upstream response as it arrives. The upstream body is never collected:
//! each chunk is handed to the caller's connection as soon as it is read,
//! and dropping the response body (caller went away) drops the upstream
//! stream with it, which closes the upstream connection.

mod error;

pub use error::ForwardError;

use crate::backend::BackendRef;
use crate::routing::Route;
use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_LENGTH, HOST};
use axum::http::{HeaderMap, HeaderValue, Method};
use axum::response::Response;
use bytes::Bytes;
use futures::{Stream, StreamExt};
use std::time::{Duration, Instant};

/// Connection-scoped headers that must not cross the proxy.
const HOP_BY_HOP_HEADERS: &[&str] = &[
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

/// Relays requests to backends over a pooled HTTP client.
#[derive(Debug, Clone)]
pub struct Forwarder {
    client: reqwest::Client,
    /// Upper bound on the wait for upstream response headers
    header_timeout: Duration,
}

impl Forwarder {
    /// Create a forwarder with its own pooled client.
    ///
    /// The client has no overall timeout: completions may stream for as long
    /// as the backend keeps producing tokens.
    pub fn new(connect_timeout: Duration, header_timeout: Duration) -> reqwest::Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(connect_timeout)
            .pool_max_idle_per_host(10)
            .build()?;

        Ok(Self::with_client(client, header_timeout))
    }

    /// Create a forwarder with a custom HTTP client (for testing).
    pub fn with_client(client: reqwest::Client, header_timeout: Duration) -> Self {
        Self {
            client,
            header_timeout,
        }
    }

    /// Send the request to `route` and stream the upstream response back.
    ///
    /// A 2xx upstream response is relayed with its status and headers and a
    /// streaming body. Anything else becomes a [`ForwardError`].
    pub async fn forward(
        &self,
        method: Method,
        inbound_headers: &HeaderMap,
        body: Bytes,
        route: &Route,
        query: Option<&str>,
    ) -> Result<Response, ForwardError> {
        let url = route.target_url(query);
        let headers = outbound_headers(inbound_headers, &route.backend);

        let request = self
            .client
            .request(method, &url)
            .headers(headers)
            .body(body);

        let started = Instant::now();
        let response = match tokio::time::timeout(self.header_timeout, request.send()).await {
            Ok(Ok(response)) => response,
            Ok(Err(e)) if e.is_timeout() => {
                return Err(ForwardError::Timeout(self.header_timeout.as_secs()))
            }
            Ok(Err(e)) => return Err(ForwardError::Unreachable(e.to_string())),
            Err(_) => return Err(ForwardError::Timeout(self.header_timeout.as_secs())),
        };

        metrics::histogram!("modelgate_upstream_header_seconds")
            .record(started.elapsed().as_secs_f64());

        let status = response.status();
        if !status.is_success() {
            tracing::debug!(url = %url, status = %status, "Upstream answered with an error status");
            return Err(ForwardError::UpstreamStatus(status));
        }

        tracing::debug!(url = %url, status = %status, "Upstream response headers received");
        Ok(relay_response(response))
    }
}

/// Headers for the outbound request.
///
/// Starts from the caller's headers, drops `host`, `content-length` and
/// hop-by-hop headers, and replaces `authorization` with the backend's
/// credential when it has one.
pub fn outbound_headers(inbound: &HeaderMap, backend: &BackendRef) -> HeaderMap {
    let mut headers = inbound.clone();
    headers.remove(HOST);
    headers.remove(CONTENT_LENGTH);
    for name in HOP_BY_HOP_HEADERS {
        headers.remove(*name);
    }

    if let Some(bearer) = backend.bearer() {
        match HeaderValue::from_str(&bearer) {
            Ok(mut value) => {
                value.set_sensitive(true);
                headers.insert(AUTHORIZATION, value);
            }
            Err(_) => {
                tracing::warn!(
                    backend = %backend,
                    "Backend credential is not a valid header value, not sent"
                );
            }
        }
    }

    headers
}

/// Response headers relayed to the caller (hop-by-hop headers excluded).
pub fn relayed_headers(upstream: &HeaderMap) -> HeaderMap {
    let mut headers = HeaderMap::with_capacity(upstream.len());
    for (name, value) in upstream {
        if !HOP_BY_HOP_HEADERS.contains(&name.as_str()) {
            headers.append(name.clone(), value.clone());
        }
    }
    headers
}

/// Turn an upstream response into a caller response with a streaming body.
fn relay_response(upstream: reqwest::Response) -> Response {
    let status = upstream.status();
    let headers = relayed_headers(upstream.headers());
    let body = Body::from_stream(relay_stream(upstream.bytes_stream()));

    let mut response = Response::new(body);
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    response
}

/// Tracks how a relayed body ended; logs when dropped.
struct RelayProgress {
    bytes: usize,
    chunks: usize,
    finished: bool,
}

impl Drop for RelayProgress {
    fn drop(&mut self) {
        if self.finished {
            tracing::debug!(bytes = self.bytes, chunks = self.chunks, "Upstream stream completed");
        } else {
            tracing::debug!(
                bytes = self.bytes,
                chunks = self.chunks,
                "Caller disconnected, upstream stream dropped"
            );
            metrics::counter!("modelgate_caller_disconnects_total").increment(1);
        }
    }
}

/// Pass upstream chunks through one by one, stopping at the first read error.
fn relay_stream<S>(upstream: S) -> impl Stream<Item = Result<Bytes, std::io::Error>> + Send + 'static
where
    S: Stream<Item = reqwest::Result<Bytes>> + Send + 'static,
{
    async_stream::stream! {
        let mut upstream = Box::pin(upstream);
        let mut progress = RelayProgress {
            bytes: 0,
            chunks: 0,
            finished: false,
        };

        while let Some(chunk) = upstream.next().await {
            match chunk {
                Ok(bytes) => {
                    progress.bytes += bytes.len();
                    progress.chunks += 1;
                    yield Ok(bytes);
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Upstream stream read error");
                    progress.finished = true;
                    yield Err(std::io::Error::other(e));
                    return;
                }
            }
        }

        progress.finished = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::resolve;

    fn inbound() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("host", HeaderValue::from_static("gateway.local"));
        headers.insert("content-length", HeaderValue::from_static("123"));
        headers.insert("content-type", HeaderValue::from_static("application/json"));
        headers.insert("authorization", HeaderValue::from_static("Bearer caller-token"));
        headers.insert("connection", HeaderValue::from_static("keep-alive"));
        headers.insert("x-custom", HeaderValue::from_static("kept"));
        headers
    }

    #[test]
    fn test_outbound_strips_host_and_length() {
        let headers = outbound_headers(&inbound(), &resolve("http://a:9000"));
        assert!(headers.get("host").is_none());
        assert!(headers.get("content-length").is_none());
        assert!(headers.get("connection").is_none());
        assert_eq!(headers.get("content-type").unwrap(), "application/json");
        assert_eq!(headers.get("x-custom").unwrap(), "kept");
    }

    #[test]
    fn test_outbound_keeps_caller_auth_without_backend_credential() {
        let headers = outbound_headers(&inbound(), &resolve("http://a:9000"));
        assert_eq!(headers.get("authorization").unwrap(), "Bearer caller-token");
    }

    #[test]
    fn test_outbound_backend_credential_overrides_caller_auth() {
        let headers = outbound_headers(&inbound(), &resolve("http://b:9000|secret"));
        assert_eq!(headers.get("authorization").unwrap(), "Bearer secret");
        assert_eq!(headers.get_all("authorization").iter().count(), 1);
    }

    #[test]
    fn test_outbound_invalid_credential_not_sent() {
        let headers = outbound_headers(&HeaderMap::new(), &resolve("http://b:9000|bad\nvalue"));
        assert!(headers.get("authorization").is_none());
    }

    #[test]
    fn test_relayed_headers_drop_hop_by_hop_only() {
        let mut upstream = HeaderMap::new();
        upstream.insert("content-type", HeaderValue::from_static("text/event-stream"));
        upstream.insert("transfer-encoding", HeaderValue::from_static("chunked"));
        upstream.insert("x-ratelimit-remaining", HeaderValue::from_static("42"));
        upstream.append("set-cookie", HeaderValue::from_static("a=1"));
        upstream.append("set-cookie", HeaderValue::from_static("b=2"));

        let headers = relayed_headers(&upstream);
        assert_eq!(headers.get("content-type").unwrap(), "text/event-stream");
        assert_eq!(headers.get("x-ratelimit-remaining").unwrap(), "42");
        assert_eq!(headers.get_all("set-cookie").iter().count(), 2);
        assert!(headers.get("transfer-encoding").is_none());
    }

    #[tokio::test]
    async fn test_relay_stream_preserves_chunks() {
        let chunks: Vec<reqwest::Result<Bytes>> = vec![
            Ok(Bytes::from_static(b"data: one\n\n")),
            Ok(Bytes::from_static(b"data: two\n\n")),
        ];
        let relayed: Vec<_> = relay_stream(futures::stream::iter(chunks)).collect().await;

        assert_eq!(relayed.len(), 2);
        assert_eq!(relayed[0].as_ref().unwrap(), &Bytes::from_static(b"data: one\n\n"));
        assert_eq!(relayed[1].as_ref().unwrap(), &Bytes::from_static(b"data: two\n\n"));
    }
}
