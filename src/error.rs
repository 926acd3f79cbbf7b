//! Error types for restpp-rs.
//!
//! This module defines domain-specific error types organized by functional area.

use thiserror::Error;

/// Top-level error type encompassing all possible errors.
#[derive(Error, Debug)]
pub enum DriverError {
    /// Connection-related errors
    #[error(transparent)]
    Connection(#[from] ConnectionError),

    /// Query execution errors
    #[error(transparent)]
    Query(#[from] QueryError),

    /// Transport-level errors
    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Errors related to establishing and configuring connections.
///
/// Every variant is fatal at construction time: a connection is either fully
/// usable when `open` returns, or it never existed.
#[derive(Error, Debug)]
pub enum ConnectionError {
    /// TLS material, keystore format, or client construction failure
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A trust-store or key-store path resolved neither locally nor through
    /// the registered file resolver
    #[error("{path} does not exist, please check this path")]
    MissingTlsFile { path: String },

    /// Transport-level failure during the token handshake
    #[error("Failed to get token: {0}")]
    AuthenticationFailed(String),

    /// Invalid connection parameters
    #[error("Invalid connection parameter '{parameter}': {message}")]
    InvalidParameter { parameter: String, message: String },

    /// Connection string parsing error
    #[error("Failed to parse connection string: {0}")]
    ParseError(String),
}

/// Errors related to query execution.
#[derive(Error, Debug)]
pub enum QueryError {
    /// All dispatch attempts failed. Carries the request description and the
    /// payload size rather than the payload itself.
    #[error("Request: {request}, payload size: {payload_size}, error: {message}")]
    RetriesExhausted {
        request: String,
        payload_size: usize,
        attempts: u32,
        message: String,
    },

    /// A multi-query submission contained no queries
    #[error("No query specified")]
    EmptyBatch,

    /// The server answered with a non-success HTTP status (strict parsing)
    #[error("Server returned status {status}: {message}")]
    Server { status: u16, message: String },

    /// The response body could not be decoded (strict parsing)
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// A request could not be constructed from the query
    #[error("Failed to build request: {0}")]
    RequestBuild(String),

    /// The connection has been closed
    #[error("Connection is closed")]
    ConnectionClosed,

    /// Interface-layer method that is intentionally unimplemented
    #[error("Operation not supported: {0}")]
    Unsupported(&'static str),
}

/// Errors raised by the transport while dispatching a single request.
///
/// These are the transient failures the executor retries; they never carry
/// an HTTP status (a response with any status is a successful dispatch).
#[derive(Error, Debug)]
pub enum TransportError {
    /// Request dispatch failed (connect, TLS negotiation, timeout, I/O)
    #[error("HTTP transport error: {0}")]
    Http(String),

    /// The request URL was rejected by the client
    #[error("Invalid request URL: {0}")]
    InvalidUrl(String),

    /// The response body could not be read
    #[error("Failed to read response body: {0}")]
    Body(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_builder() {
            TransportError::InvalidUrl(err.to_string())
        } else if err.is_body() || err.is_decode() {
            TransportError::Body(err.to_string())
        } else {
            TransportError::Http(err.to_string())
        }
    }
}
