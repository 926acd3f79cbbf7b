//! Query execution: translation, dispatch, and response handling.

pub mod executor;
pub mod request;
pub mod response;

pub use executor::{QueryExecutor, MAX_ATTEMPTS};
pub use request::{EndpointQuery, QueryTranslator, RequestTarget};
pub use response::RestResponse;
