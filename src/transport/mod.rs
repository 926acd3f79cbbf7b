//! Transport layer for cluster communication.
//!
//! This module provides the transport abstraction and its HTTP
//! implementation, plus construction of the TLS-configured client.
//!
//! # Architecture
//!
//! - `protocol` - the `Transport` trait and request/response value types
//! - `http` - `reqwest`-backed implementation
//! - `tls` - one-time client construction from trust/key material

pub mod http;
pub mod protocol;
pub mod tls;

pub use http::HttpTransport;
pub use protocol::{HttpMethod, RawResponse, RestRequest, Transport};
pub use tls::{build_http_client, FileResolver, StoreDescriptor, StoreFormat};
