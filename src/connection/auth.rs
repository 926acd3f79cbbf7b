//! Token acquisition handshake.
//!
//! The handshake runs at most once, while the connection is being opened,
//! and only when no token was pre-supplied and username, password, and graph
//! are all configured. Its failure modes are deliberately asymmetric:
//!
//! - a transport-level failure (unreachable host, TLS negotiation) is a hard
//!   error that aborts connection construction;
//! - any response that yields no token (auth disabled on the cluster,
//!   rejected credentials, malformed body) is a soft failure — the
//!   connection proceeds without a token.

use serde::Serialize;
use tracing::debug;

use crate::connection::params::ConnectionParams;
use crate::connection::version::TokenRequestStyle;
use crate::error::ConnectionError;
use crate::query::response::RestResponse;
use crate::transport::protocol::{HttpMethod, RestRequest, Transport};

/// Fixed token-acquisition path.
const TOKEN_PATH: &str = "/gsqlserver/gsql/authtoken";

/// JSON body of the token request, for servers at or above the baseline.
#[derive(Debug, Serialize)]
struct TokenRequestBody<'a> {
    graph: &'a str,
}

/// Build the token-acquisition request for the configured server version.
///
/// Servers below the baseline take the graph name as a URL query parameter
/// with an empty body; newer servers take a JSON body instead. Both carry the
/// Basic authorization header and `Accept: application/json`.
pub(crate) fn build_token_request(params: &ConnectionParams, graph: &str) -> RestRequest {
    let scheme = if params.use_tls { "https" } else { "http" };
    let mut url = format!("{}://{}:{}{}", scheme, params.host, params.port, TOKEN_PATH);

    let mut request = match params.token_request_style() {
        TokenRequestStyle::QueryParameter => {
            url.push_str("?graph=");
            url.push_str(&urlencoding::encode(graph));
            RestRequest::new(HttpMethod::Post, url)
        }
        TokenRequestStyle::JsonBody => {
            let body = serde_json::to_string(&TokenRequestBody { graph })
                .unwrap_or_else(|_| format!("{{\"graph\":\"{}\"}}", graph));
            RestRequest::new(HttpMethod::Post, url)
                .header("Content-Type", "application/json")
                .body(body)
        }
    };

    request = request
        .header("Authorization", params.basic_auth().to_string())
        .header("Accept", "application/json");
    request
}

/// Perform the handshake and return the token, if the cluster issued one.
///
/// Response example:
/// `{"error":false,"message":"","results":{"token":"5r6scnj83963gnfjqtvico1hf2hn394o"}}`
pub(crate) async fn request_token(
    transport: &dyn Transport,
    params: &ConnectionParams,
) -> Result<Option<String>, ConnectionError> {
    let Some(graph) = params.graph.as_deref() else {
        return Ok(None);
    };

    let request = build_token_request(params, graph);

    let raw = transport
        .send(&request)
        .await
        .map_err(|e| ConnectionError::AuthenticationFailed(e.to_string()))?;

    // Non-strict parse: clusters with authentication disabled answer this
    // request with an error status, and that must not fail the connection.
    let response = RestResponse::parse_lenient(&raw);
    match response.first_token() {
        Some(token) => {
            debug!("Got token");
            Ok(Some(token))
        }
        None => {
            debug!(status = raw.status, "Token request yielded no token, proceeding without one");
            Ok(None)
        }
    }
}
