//! Connection lifecycle: open, execute, close.
//!
//! A [`Connection`] is fully usable the moment `open` returns: the HTTP
//! client is built, the token handshake (when applicable) has run, and the
//! executor holds the final dispatch state. After that nothing about the
//! connection mutates except the closed flag, so it can be shared across
//! tasks freely.

pub mod auth;
pub mod params;
pub mod version;

use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::error::{ConnectionError, QueryError};
use crate::query::executor::QueryExecutor;
use crate::query::request::QueryTranslator;
use crate::query::response::RestResponse;
use crate::transport::http::HttpTransport;
use crate::transport::protocol::Transport;
use crate::transport::tls::build_http_client;

pub use params::{ConnectionBuilder, ConnectionParams};
pub use version::{ServerVersion, TokenRequestStyle};

/// An open connection to a cluster.
pub struct Connection {
    params: ConnectionParams,
    executor: QueryExecutor,
    closed: AtomicBool,
    transaction_isolation: AtomicI32,
}

impl Connection {
    /// Open a connection: build the HTTP client from the TLS configuration,
    /// then run the token handshake when credentials and a graph are set.
    pub async fn open(params: ConnectionParams) -> Result<Self, ConnectionError> {
        let client = build_http_client(&params)?;
        let transport: Arc<dyn Transport> = Arc::new(HttpTransport::new(client));
        Self::connect_with(params, transport).await
    }

    /// Open a connection over an already-constructed transport.
    ///
    /// This is the seam `open` goes through; it also lets callers substitute
    /// their own transport.
    pub async fn connect_with(
        params: ConnectionParams,
        transport: Arc<dyn Transport>,
    ) -> Result<Self, ConnectionError> {
        let token = if let Some(token) = params.token() {
            Some(token.to_string())
        } else if params.should_request_token() {
            auth::request_token(transport.as_ref(), &params).await?
        } else {
            None
        };

        debug!(%params, token = token.is_some(), "Connection opened");

        let executor = QueryExecutor::new(transport, &params, token);
        Ok(Self {
            params,
            executor,
            closed: AtomicBool::new(false),
            transaction_isolation: AtomicI32::new(1),
        })
    }

    /// Execute a single query.
    pub async fn execute_query(
        &self,
        query: &dyn QueryTranslator,
        payload: &str,
    ) -> Result<RestResponse, QueryError> {
        self.ensure_open()?;
        self.executor.execute(query, payload).await
    }

    /// Execute a batch of queries in order; records are merged in
    /// submission order.
    pub async fn execute_queries(
        &self,
        queries: &[&dyn QueryTranslator],
    ) -> Result<RestResponse, QueryError> {
        self.ensure_open()?;
        self.executor.execute_batch(queries).await
    }

    fn ensure_open(&self) -> Result<(), QueryError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(QueryError::ConnectionClosed);
        }
        Ok(())
    }

    /// Close the connection. Idempotent; subsequent executions fail.
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    /// Whether `close` has been called.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// The parameters this connection was opened with.
    pub fn params(&self) -> &ConnectionParams {
        &self.params
    }

    /// Bearer token in use, whether pre-supplied or acquired.
    pub fn token(&self) -> Option<&str> {
        self.executor.token()
    }

    /// Every request is effectively auto-committed.
    pub fn auto_commit(&self) -> bool {
        true
    }

    /// No transactional state to publish.
    pub fn commit(&self) -> Result<(), QueryError> {
        self.ensure_open()
    }

    /// No transactional state to discard.
    pub fn rollback(&self) -> Result<(), QueryError> {
        self.ensure_open()
    }

    /// Stored for interface compatibility; no effect on execution.
    pub fn set_transaction_isolation(&self, level: i32) {
        self.transaction_isolation.store(level, Ordering::SeqCst);
    }

    /// The level last set, or the default.
    pub fn transaction_isolation(&self) -> i32 {
        self.transaction_isolation.load(Ordering::SeqCst)
    }

    /// Liveness probing is not part of the protocol.
    pub fn is_valid(&self) -> bool {
        true
    }

    pub fn set_holdability(&self, _holdability: i32) -> Result<(), QueryError> {
        Err(QueryError::Unsupported("holdability"))
    }

    pub fn holdability(&self) -> Result<i32, QueryError> {
        Err(QueryError::Unsupported("holdability"))
    }

    /// Column separator configured for loading jobs.
    pub fn separator(&self) -> Option<&str> {
        self.params.separator.as_deref()
    }

    /// Line terminator configured for loading jobs.
    pub fn eol(&self) -> Option<&str> {
        self.params.eol.as_deref()
    }

    /// Retrieval limit handed through to statements.
    pub fn limit(&self) -> Option<&str> {
        self.params.limit.as_deref()
    }

    /// Source vertex id for edge retrieval.
    pub fn source(&self) -> Option<&str> {
        self.params.source.as_deref()
    }

    /// Source vertex type for edge retrieval.
    pub fn src_vertex_type(&self) -> Option<&str> {
        self.params.src_vertex_type.as_deref()
    }

    /// Column definitions for loading jobs.
    pub fn line_schema(&self) -> Option<&str> {
        self.params.line_schema.as_deref()
    }

    /// The `Basic` authorization header value.
    pub fn basic_auth(&self) -> &str {
        self.params.basic_auth()
    }

    /// Query-timeout pass-through value.
    pub fn timeout(&self) -> Option<Duration> {
        self.params.timeout
    }

    /// Atomicity pass-through flag.
    pub fn atomic(&self) -> i32 {
        self.params.atomic
    }
}
