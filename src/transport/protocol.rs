//! Transport abstraction for dispatching REST requests.
//!
//! This module defines the `Transport` trait that abstracts the HTTP client
//! from the components that use it (handshake, query executor), along with
//! the request and response value types that cross that seam.

use crate::error::TransportError;
use async_trait::async_trait;
use std::fmt;

/// HTTP method of an outbound request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Delete,
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HttpMethod::Get => write!(f, "GET"),
            HttpMethod::Post => write!(f, "POST"),
            HttpMethod::Delete => write!(f, "DELETE"),
        }
    }
}

/// A fully built outbound request.
///
/// Produced by the query-to-request translator (or the token handshake) and
/// consumed by a [`Transport`]. The `Display` form is the bounded request
/// description used in error messages: method and URL, never the body.
#[derive(Debug, Clone)]
pub struct RestRequest {
    /// HTTP method
    pub method: HttpMethod,
    /// Absolute request URL
    pub url: String,
    /// Header name/value pairs
    pub headers: Vec<(String, String)>,
    /// Optional request body
    pub body: Option<String>,
}

impl RestRequest {
    /// Create a request with no headers or body.
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    /// Append a header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Set the request body.
    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }
}

impl fmt::Display for RestRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.url)
    }
}

/// A raw response as seen by the transport: status code and body text.
///
/// Interpretation of the status (strict vs non-strict) belongs to the
/// response parser, not the transport.
#[derive(Debug, Clone)]
pub struct RawResponse {
    /// HTTP status code
    pub status: u16,
    /// Response body text
    pub body: String,
}

impl RawResponse {
    /// Whether the status code is in the 2xx range.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Transport seam between the driver core and the HTTP client.
///
/// `send` returns `Ok` for every request that produced a response, whatever
/// its status code; `Err` is reserved for transport-level failures
/// (connection refused, TLS negotiation, timeouts). The handshake's soft/hard
/// failure split and the executor's retry policy both rely on that contract.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Dispatch a request and collect the response.
    async fn send(&self, request: &RestRequest) -> Result<RawResponse, TransportError>;
}
