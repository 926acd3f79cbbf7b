//! Query-to-request translation seam.
//!
//! Turning a parsed query into a concrete HTTP request belongs to the query
//! layer, not the connection core. The executor supplies everything a
//! translator may need — the selected host, port, TLS flag, graph, token,
//! serialized payload, and loading-job parameters — through [`RequestTarget`]
//! and lets a [`QueryTranslator`] implementation produce the request.

use crate::error::QueryError;
use crate::transport::protocol::{HttpMethod, RestRequest};

/// Everything the executor knows when a request must be built.
///
/// The host is re-selected per attempt, so a translator is invoked once per
/// attempt with a possibly different host each time.
#[derive(Debug, Clone, Copy)]
pub struct RequestTarget<'a> {
    /// Selected endpoint host for this attempt
    pub host: &'a str,
    /// REST endpoint port
    pub port: u16,
    /// Use HTTPS
    pub use_tls: bool,
    /// Graph the connection is scoped to
    pub graph: Option<&'a str>,
    /// Bearer token, when the handshake produced one
    pub token: Option<&'a str>,
    /// Serialized query payload
    pub payload: &'a str,
    /// Loading-job file name
    pub filename: Option<&'a str>,
    /// Loading-job column separator
    pub separator: Option<&'a str>,
    /// Loading-job line terminator
    pub eol: Option<&'a str>,
}

impl RequestTarget<'_> {
    /// Scheme, host, and port of the selected endpoint.
    pub fn base_url(&self) -> String {
        let scheme = if self.use_tls { "https" } else { "http" };
        format!("{}://{}:{}", scheme, self.host, self.port)
    }
}

/// Translates a parsed query into a concrete request.
///
/// Implementations own the endpoint path, method, and payload placement;
/// the executor owns host selection, dispatch, and retries.
pub trait QueryTranslator: Send + Sync {
    /// Build the outbound request for the given target.
    fn build_request(&self, target: &RequestTarget<'_>) -> Result<RestRequest, QueryError>;
}

/// Minimal built-in translator: send the payload to a fixed endpoint path.
///
/// Dedicated query languages plug in their own [`QueryTranslator`]; this one
/// covers direct endpoint invocation, e.g. installed-query and echo paths.
#[derive(Debug, Clone)]
pub struct EndpointQuery {
    path: String,
    method: HttpMethod,
}

impl EndpointQuery {
    /// POST to an endpoint path (leading slash included).
    pub fn post(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            method: HttpMethod::Post,
        }
    }

    /// GET from an endpoint path.
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            method: HttpMethod::Get,
        }
    }
}

impl QueryTranslator for EndpointQuery {
    fn build_request(&self, target: &RequestTarget<'_>) -> Result<RestRequest, QueryError> {
        if !self.path.starts_with('/') {
            return Err(QueryError::RequestBuild(format!(
                "Endpoint path '{}' must start with '/'",
                self.path
            )));
        }

        let mut request = RestRequest::new(self.method, format!("{}{}", target.base_url(), self.path))
            .header("Accept", "application/json");

        if let Some(token) = target.token {
            request = request.header("Authorization", format!("Bearer {}", token));
        }

        if self.method == HttpMethod::Post && !target.payload.is_empty() {
            request = request
                .header("Content-Type", "application/json")
                .body(target.payload.to_string());
        }

        Ok(request)
    }
}
