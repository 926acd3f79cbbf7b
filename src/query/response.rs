//! Structured REST responses.
//!
//! The endpoint answers every request with a JSON envelope:
//! `{"error": bool, "message": string, "results": object | [object, ...]}`.
//! This module normalizes that envelope into an ordered record list. Query
//! execution parses strictly (a non-success status is an error); the token
//! handshake parses leniently (anything unusable just yields no records).

use serde::Deserialize;
use serde_json::Value;

use crate::error::QueryError;
use crate::transport::protocol::RawResponse;

/// Longest body excerpt quoted in error messages.
const ERROR_SNIPPET_LEN: usize = 200;

/// Response envelope as it appears on the wire.
#[derive(Debug, Deserialize)]
struct RawBody {
    #[serde(default)]
    error: bool,
    #[serde(default)]
    message: String,
    #[serde(default)]
    results: Option<Value>,
}

/// A parsed response: the envelope flags plus an ordered record list.
#[derive(Debug, Clone)]
pub struct RestResponse {
    error: bool,
    message: String,
    results: Vec<Value>,
}

impl RestResponse {
    /// Parse a raw response.
    ///
    /// In strict mode a non-success HTTP status or an undecodable body is an
    /// error. In lenient mode both degrade to an empty record list with the
    /// error flag set.
    pub fn parse(raw: &RawResponse, strict: bool) -> Result<Self, QueryError> {
        if strict && !raw.is_success() {
            return Err(QueryError::Server {
                status: raw.status,
                message: status_message(raw),
            });
        }

        match serde_json::from_str::<RawBody>(&raw.body) {
            Ok(body) => Ok(Self {
                error: body.error,
                message: body.message,
                results: normalize_results(body.results),
            }),
            Err(e) if strict => Err(QueryError::MalformedResponse(e.to_string())),
            Err(_) => Ok(Self {
                error: true,
                message: snippet(&raw.body),
                results: Vec::new(),
            }),
        }
    }

    /// Parse without ever failing; used by the token handshake.
    pub fn parse_lenient(raw: &RawResponse) -> Self {
        match Self::parse(raw, false) {
            Ok(response) => response,
            // Unreachable: lenient parsing has no error paths.
            Err(_) => Self {
                error: true,
                message: String::new(),
                results: Vec::new(),
            },
        }
    }

    /// Whether the envelope's error flag was set.
    pub fn is_error(&self) -> bool {
        self.error
    }

    /// The envelope's message field.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Result records, in server order.
    pub fn results(&self) -> &[Value] {
        &self.results
    }

    /// Consume the response, yielding its records.
    pub fn into_results(self) -> Vec<Value> {
        self.results
    }

    /// Append another response's records, preserving order.
    pub fn append_results(&mut self, results: Vec<Value>) {
        self.results.extend(results);
    }

    /// Scan the records for the first one carrying a string `token` field.
    pub fn first_token(&self) -> Option<String> {
        self.results
            .iter()
            .find_map(|record| record.get("token").and_then(Value::as_str))
            .map(str::to_string)
    }
}

/// Normalize the `results` field: the server sends either a single object or
/// a list; absent or null means no records.
fn normalize_results(results: Option<Value>) -> Vec<Value> {
    match results {
        Some(Value::Array(items)) => items,
        Some(Value::Null) | None => Vec::new(),
        Some(single) => vec![single],
    }
}

fn status_message(raw: &RawResponse) -> String {
    match serde_json::from_str::<RawBody>(&raw.body) {
        Ok(body) if !body.message.is_empty() => body.message,
        _ => snippet(&raw.body),
    }
}

fn snippet(body: &str) -> String {
    body.chars().take(ERROR_SNIPPET_LEN).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(status: u16, body: &str) -> RawResponse {
        RawResponse {
            status,
            body: body.to_string(),
        }
    }

    #[test]
    fn test_parse_results_list() {
        let response = RestResponse::parse(
            &raw(200, r#"{"error":false,"message":"","results":[{"a":1},{"b":2}]}"#),
            true,
        )
        .unwrap();

        assert!(!response.is_error());
        assert_eq!(response.results().len(), 2);
        assert_eq!(response.results()[0]["a"], 1);
    }

    #[test]
    fn test_parse_results_single_object() {
        let response = RestResponse::parse(
            &raw(200, r#"{"error":false,"message":"","results":{"token":"abc"}}"#),
            true,
        )
        .unwrap();

        assert_eq!(response.results().len(), 1);
        assert_eq!(response.first_token().as_deref(), Some("abc"));
    }

    #[test]
    fn test_parse_missing_results() {
        let response =
            RestResponse::parse(&raw(200, r#"{"error":true,"message":"boom"}"#), true).unwrap();

        assert!(response.is_error());
        assert_eq!(response.message(), "boom");
        assert!(response.results().is_empty());
    }

    #[test]
    fn test_strict_rejects_error_status() {
        let result = RestResponse::parse(
            &raw(503, r#"{"error":true,"message":"overloaded","results":[]}"#),
            true,
        );

        match result {
            Err(QueryError::Server { status, message }) => {
                assert_eq!(status, 503);
                assert_eq!(message, "overloaded");
            }
            other => panic!("Expected Server error, got {:?}", other),
        }
    }

    #[test]
    fn test_strict_rejects_malformed_body() {
        let result = RestResponse::parse(&raw(200, "<html>oops</html>"), true);
        assert!(matches!(result, Err(QueryError::MalformedResponse(_))));
    }

    #[test]
    fn test_lenient_tolerates_error_status_and_garbage() {
        let response = RestResponse::parse_lenient(&raw(401, "Unauthorized"));
        assert!(response.is_error());
        assert!(response.results().is_empty());
        assert!(response.first_token().is_none());
    }

    #[test]
    fn test_first_token_scans_past_tokenless_records() {
        let response = RestResponse::parse(
            &raw(
                200,
                r#"{"error":false,"message":"","results":[{"other":"x"},{"token":"t2"},{"token":"t3"}]}"#,
            ),
            true,
        )
        .unwrap();

        assert_eq!(response.first_token().as_deref(), Some("t2"));
    }

    #[test]
    fn test_first_token_ignores_non_string_token() {
        let response = RestResponse::parse(
            &raw(200, r#"{"error":false,"message":"","results":[{"token":42}]}"#),
            true,
        )
        .unwrap();

        assert!(response.first_token().is_none());
    }

    #[test]
    fn test_append_results_preserves_order() {
        let mut first = RestResponse::parse(
            &raw(200, r#"{"error":false,"message":"","results":[{"id":"a1"}]}"#),
            true,
        )
        .unwrap();
        let second = RestResponse::parse(
            &raw(200, r#"{"error":false,"message":"","results":[{"id":"b1"},{"id":"b2"}]}"#),
            true,
        )
        .unwrap();

        first.append_results(second.into_results());

        let ids: Vec<_> = first
            .results()
            .iter()
            .map(|record| record["id"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(ids, vec!["a1", "b1", "b2"]);
    }

    #[test]
    fn test_error_snippet_is_bounded() {
        let big = "x".repeat(10_000);
        let result = RestResponse::parse(&raw(500, &big), true);
        match result {
            Err(QueryError::Server { message, .. }) => {
                assert!(message.len() <= ERROR_SNIPPET_LEN);
            }
            other => panic!("Expected Server error, got {:?}", other),
        }
    }
}
