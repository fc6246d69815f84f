//! HTTP transport boundary
//!
//! The client never talks to an HTTP stack directly. It hands an
//! [`HttpRequest`] to an [`HttpTransport`] and reads back an
//! [`HttpResponse`]. The transport is chosen once, when the client is built:
//!
//! 1. a transport passed to [`ClientBuilder::transport`](crate::ClientBuilder::transport)
//! 2. otherwise [`ReqwestTransport`], when the `reqwest` feature is enabled
//! 3. otherwise construction fails with [`Error::Configuration`]
//!
//! Injecting a transport is also how tests run the client without a server.

use async_trait::async_trait;
use odoo_jrpc_core::{codec, Error, Result};
use std::sync::Arc;

/// Message returned when no transport can be resolved
pub const MISSING_TRANSPORT: &str = "no HTTP transport available: enable the `reqwest` feature \
     of odoo-jrpc-client or supply one with ClientBuilder::transport";

/// An outgoing HTTP request
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    /// Absolute URL
    pub url: String,
    /// HTTP method, always "POST" for JSON-RPC
    pub method: String,
    /// Header name/value pairs in send order
    pub headers: Vec<(String, String)>,
    /// Serialized JSON body
    pub body: String,
}

impl HttpRequest {
    /// Build a POST request with no headers
    pub fn post(url: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: "POST".to_string(),
            headers: Vec::new(),
            body: body.into(),
        }
    }

    /// Append a header
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Case-insensitive header lookup (first match)
    pub fn header(&self, name: &str) -> Option<&str> {
        header_value(&self.headers, name)
    }
}

/// A received HTTP response
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    /// Status code
    pub status: u16,
    /// Header name/value pairs; repeated headers appear once per value
    pub headers: Vec<(String, String)>,
    /// Raw body
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Create an empty response with the given status
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: Vec::new(),
        }
    }

    /// 200 response with a JSON body
    pub fn json_body(value: &serde_json::Value) -> Self {
        Self::new(200)
            .with_header("Content-Type", "application/json")
            .with_body(value.to_string())
    }

    /// Append a header
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Replace the body
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Case-insensitive header lookup (first match)
    pub fn header(&self, name: &str) -> Option<&str> {
        header_value(&self.headers, name)
    }

    /// All values of a header, case-insensitively
    pub fn header_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.headers
            .iter()
            .filter(move |(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Decode the body as JSON
    pub fn json(&self) -> Result<serde_json::Value> {
        codec::decode_body(&self.body)
    }

    /// Check for a 2xx status
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

fn header_value<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(n, _)| n.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}

/// The one capability the client needs from an HTTP stack
///
/// Implementations must not follow cookies on their own; the client manages
/// the session cookie itself.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Send a request and return the response
    ///
    /// Network-level failures are reported as [`Error::Transport`]. Non-2xx
    /// statuses are not errors at this level.
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse>;
}

type BuiltinTransport = fn() -> Arc<dyn HttpTransport>;

#[cfg(feature = "reqwest")]
const BUILTIN_TRANSPORT: Option<BuiltinTransport> = Some(reqwest_transport);

#[cfg(not(feature = "reqwest"))]
const BUILTIN_TRANSPORT: Option<BuiltinTransport> = None;

/// Resolve the transport used for the lifetime of a client
pub(crate) fn resolve_transport(
    explicit: Option<Arc<dyn HttpTransport>>,
) -> Result<Arc<dyn HttpTransport>> {
    resolve_with(explicit, BUILTIN_TRANSPORT)
}

fn resolve_with(
    explicit: Option<Arc<dyn HttpTransport>>,
    builtin: Option<BuiltinTransport>,
) -> Result<Arc<dyn HttpTransport>> {
    match (explicit, builtin) {
        (Some(transport), _) => Ok(transport),
        (None, Some(make)) => Ok(make()),
        (None, None) => Err(Error::Configuration(MISSING_TRANSPORT.to_string())),
    }
}

#[cfg(feature = "reqwest")]
fn reqwest_transport() -> Arc<dyn HttpTransport> {
    tracing::debug!("Using built-in reqwest transport");
    Arc::new(ReqwestTransport::new())
}

/// Transport backed by a `reqwest::Client`
///
/// The default client has no cookie store, so `Set-Cookie` headers reach the
/// session logic untouched.
#[cfg(feature = "reqwest")]
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    http: reqwest::Client,
}

#[cfg(feature = "reqwest")]
impl ReqwestTransport {
    /// Create a transport with a default `reqwest::Client`
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an existing client (custom timeouts, proxies, ...)
    pub fn with_client(http: reqwest::Client) -> Self {
        Self { http }
    }
}

#[cfg(feature = "reqwest")]
#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        let method = reqwest::Method::from_bytes(request.method.as_bytes())
            .map_err(|e| {
                Error::Transport(format!("invalid HTTP method {}: {}", request.method, e))
            })?;

        let mut builder = self.http.request(method, &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let response = builder
            .body(request.body)
            .send()
            .await
            .map_err(|e| Error::Transport(format!("request to {} failed: {}", request.url, e)))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();

        let body = response
            .bytes()
            .await
            .map_err(|e| Error::Transport(format!("failed to read response body: {}", e)))?
            .to_vec();

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}
