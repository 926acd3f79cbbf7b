//! HTTP transport implementation backed by `reqwest`.
//!
//! One `HttpTransport` exists per logical connection. The wrapped client is
//! built once by the TLS configurator and shared by every query issued
//! through the connection; `reqwest::Client` carries no per-call state, so
//! concurrent use from multiple tasks needs no locking here.

use async_trait::async_trait;

use crate::error::TransportError;

use super::protocol::{HttpMethod, RawResponse, RestRequest, Transport};

/// HTTP transport over a shared `reqwest` client.
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Wrap a configured client.
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl From<HttpMethod> for reqwest::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Delete => reqwest::Method::DELETE,
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: &RestRequest) -> Result<RawResponse, TransportError> {
        let mut builder = self
            .client
            .request(request.method.into(), &request.url);

        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }

        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        Ok(RawResponse { status, body })
    }
}
