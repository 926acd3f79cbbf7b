//! Query dispatch with retry and host-level load balancing.
//!
//! The executor owns the resilient part of query execution: picking an
//! endpoint host per attempt, dispatching through the shared transport, and
//! retrying transport failures up to a fixed ceiling. Once any response is
//! obtained the attempt loop ends — application-level errors in a response
//! are the caller's business, not grounds for a retry.

use std::sync::Arc;

use rand::Rng;
use tracing::{debug, error};

use crate::connection::params::ConnectionParams;
use crate::error::QueryError;
use crate::query::request::{QueryTranslator, RequestTarget};
use crate::query::response::RestResponse;
use crate::transport::protocol::Transport;

/// Total dispatch attempts per query. Fixed, not configurable.
pub const MAX_ATTEMPTS: u32 = 10;

/// Executes parsed queries against the cluster.
///
/// One executor exists per connection; it holds the connection's immutable
/// dispatch state (host pool, graph, token) and the shared transport, so it
/// is safe to use from multiple tasks concurrently.
pub struct QueryExecutor {
    transport: Arc<dyn Transport>,
    endpoint_hosts: Vec<String>,
    port: u16,
    use_tls: bool,
    graph: Option<String>,
    token: Option<String>,
    filename: Option<String>,
    separator: Option<String>,
    eol: Option<String>,
}

impl QueryExecutor {
    /// Build an executor from connection parameters, the shared transport,
    /// and the token the handshake produced (if any).
    pub fn new(
        transport: Arc<dyn Transport>,
        params: &ConnectionParams,
        token: Option<String>,
    ) -> Self {
        Self {
            transport,
            endpoint_hosts: params.endpoint_hosts().to_vec(),
            port: params.port,
            use_tls: params.use_tls,
            graph: params.graph.clone(),
            token,
            filename: params.filename.clone(),
            separator: params.separator.clone(),
            eol: params.eol.clone(),
        }
    }

    /// The token attached to outbound requests, if any.
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Pick the host for one attempt: uniformly at random when a pool is
    /// configured, re-sampled independently on every attempt.
    fn pick_host(&self) -> &str {
        if self.endpoint_hosts.len() > 1 {
            let index = rand::thread_rng().gen_range(0..self.endpoint_hosts.len());
            &self.endpoint_hosts[index]
        } else {
            &self.endpoint_hosts[0]
        }
    }

    fn target<'a>(&'a self, host: &'a str, payload: &'a str) -> RequestTarget<'a> {
        RequestTarget {
            host,
            port: self.port,
            use_tls: self.use_tls,
            graph: self.graph.as_deref(),
            token: self.token.as_deref(),
            payload,
            filename: self.filename.as_deref(),
            separator: self.separator.as_deref(),
            eol: self.eol.as_deref(),
        }
    }

    /// Execute a single query, retrying transport failures.
    ///
    /// The first response obtained — whatever it says — is parsed strictly
    /// and returned. When all attempts fail at the transport level, the
    /// error carries the request description and the payload size, never
    /// the payload itself.
    pub async fn execute(
        &self,
        query: &dyn QueryTranslator,
        payload: &str,
    ) -> Result<RestResponse, QueryError> {
        let mut last_request = String::new();
        let mut last_error = String::new();

        for attempt in 0..MAX_ATTEMPTS {
            let host = self.pick_host();
            let request = query.build_request(&self.target(host, payload))?;

            match self.transport.send(&request).await {
                Ok(raw) => {
                    if attempt > 0 {
                        debug!(retries = attempt, "Rest request succeeded after retry");
                    }
                    return RestResponse::parse(&raw, true);
                }
                Err(e) => {
                    last_request = request.to_string();
                    last_error = e.to_string();
                    if attempt + 1 < MAX_ATTEMPTS {
                        debug!(attempt = attempt + 1, error = %last_error, "Request failed, retrying");
                    }
                }
            }
        }

        error!(
            request = %last_request,
            payload_size = payload.len(),
            error = %last_error,
            "Request failed after all retries"
        );
        Err(QueryError::RetriesExhausted {
            request: last_request,
            payload_size: payload.len(),
            attempts: MAX_ATTEMPTS,
            message: last_error,
        })
    }

    /// Execute a batch of queries strictly in order and merge their records.
    ///
    /// Fail-fast: the first fatal error aborts the remaining queries. The
    /// merged record list preserves submission order.
    pub async fn execute_batch(
        &self,
        queries: &[&dyn QueryTranslator],
    ) -> Result<RestResponse, QueryError> {
        let Some((first, rest)) = queries.split_first() else {
            return Err(QueryError::EmptyBatch);
        };

        let mut merged = self.execute(*first, "").await?;
        for query in rest {
            let next = self.execute(*query, "").await?;
            merged.append_results(next.into_results());
        }

        Ok(merged)
    }
}
