#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]

//! # `orbit-transport`: the Circular wire contract
//!
//! Every upstream call is a single POST of a JSON body that carries the wire
//! `Version` and an operation selector; every answer is an [`Envelope`]
//! `{Result:int, Response:<data|error>}` where `Result == 200` means success.
//!
//! This crate owns that contract so that the HTTP backend, the mock server and
//! the parity runner agree on it:
//!
//! - [`Transport`] is the async interface a backend implements;
//! - [`Envelope`] and [`build_request`] are the two halves of the wire format;
//! - [`RouteTable`] is the mock route table derived from the catalog's example pairs.
//!
//! ## Example
//! ```no_run
//! use serde_json::json;
//! use transport::{build_request, DynTransport, TransportError};
//!
//! async fn demo(transport: DynTransport) -> Result<(), TransportError> {
//!     let request = build_request(
//!         "getBlockCount",
//!         "2.0.0-alpha.1",
//!         json!({"Blockchain": "MainNet"}).as_object().cloned().unwrap_or_default(),
//!     );
//!     let envelope = transport.send(&request).await?;
//!     println!("blocks = {}", envelope.response);
//!     Ok(())
//! }
//! ```

pub mod routes;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub use routes::{MockRoute, RouteTable};

/// Request field carrying the operation selector.
pub const SELECTOR_FIELD: &str = "Operation";

/// Request field carrying the wire version.
pub const VERSION_FIELD: &str = "Version";

/// `Result` code of a successful call.
pub const STATUS_OK: i64 = 200;

/// Type alias for structured error handling in transport operations.
pub type Result<T> = std::result::Result<T, TransportError>;

/// Canonical error type for all transport implementations.
///
/// A non-200 envelope is *not* a transport error: it decodes to an
/// [`Envelope`] and the caller decides what the code means.
#[derive(thiserror::Error, Debug)]
pub enum TransportError {
    /// An HTTP-level failure (connection refused, timeout, or bad status code).
    #[error("HTTP transport error: {0}")]
    Http(String),

    /// Failure to serialize or deserialize a JSON payload.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// The body was JSON but not a `{Result, Response}` envelope.
    #[error("Invalid response format: {0}")]
    InvalidFormat(String),

    /// Reading or writing a route table failed.
    #[error("I/O error: {0}")]
    Io(String),
}

impl From<serde_json::Error> for TransportError {
    fn from(err: serde_json::Error) -> Self { TransportError::Serialization(err.to_string()) }
}

impl From<std::io::Error> for TransportError {
    fn from(err: std::io::Error) -> Self { TransportError::Io(err.to_string()) }
}

/// The `{Result, Response}` answer of every call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    /// Status code; 200 is success
    #[serde(rename = "Result")]
    pub result: i64,
    /// Payload on success, error message otherwise
    #[serde(rename = "Response")]
    pub response: Value,
}

impl Envelope {
    /// A successful envelope.
    pub fn ok(response: Value) -> Self { Self { result: STATUS_OK, response } }

    /// An error envelope with a string message.
    pub fn error(code: i64, message: impl Into<String>) -> Self {
        Self { result: code, response: Value::String(message.into()) }
    }

    /// Whether `Result == 200`.
    pub fn is_success(&self) -> bool { self.result == STATUS_OK }

    /// The error message of a non-200 envelope.
    pub fn error_message(&self) -> Option<String> {
        if self.is_success() {
            return None;
        }
        Some(match &self.response {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
    }

    /// Decode an envelope from a JSON value, rejecting anything else.
    pub fn from_value(value: Value) -> Result<Self> {
        let result = value
            .get("Result")
            .and_then(Value::as_i64)
            .ok_or_else(|| TransportError::InvalidFormat(format!("missing integer Result in {}", value)))?;
        let response = value.get("Response").cloned().unwrap_or(Value::Null);
        Ok(Self { result, response })
    }

    /// Decode an envelope from response text.
    pub fn from_text(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text)
            .map_err(|e| TransportError::Serialization(format!("{} (body: {})", e, text)))?;
        Self::from_value(value)
    }

    /// Compact JSON encoding.
    pub fn to_text(&self) -> String { Value::from(self).to_string() }
}

impl From<&Envelope> for Value {
    fn from(envelope: &Envelope) -> Self {
        let mut map = Map::new();
        map.insert("Result".to_string(), Value::from(envelope.result));
        map.insert("Response".to_string(), envelope.response.clone());
        Value::Object(map)
    }
}

/// Build a request body: `params` plus the selector and version fields.
///
/// Selector and version always win over same-named entries in `params`.
pub fn build_request(operation: &str, version: &str, mut params: Map<String, Value>) -> Value {
    params.insert(SELECTOR_FIELD.to_string(), Value::String(operation.to_string()));
    params.insert(VERSION_FIELD.to_string(), Value::String(version.to_string()));
    Value::Object(params)
}

/// The operation selector of a request body, if present.
pub fn selector_of(request: &Value) -> Option<&str> {
    request.get(SELECTOR_FIELD).and_then(Value::as_str)
}

/// The base transport trait for single-message delivery.
#[async_trait]
pub trait Transport: Send + Sync {
    /// POST one request body and decode the answer envelope.
    ///
    /// A non-200 envelope is returned as `Ok`; only failures to deliver the
    /// request or decode the answer are errors.
    async fn send(&self, request: &Value) -> Result<Envelope>;

    /// Returns the configured endpoint.
    ///
    /// For network transports, this is the URL.
    /// For in-memory transports, it may be a symbolic name.
    fn endpoint(&self) -> &str;
}

/// Type alias for a shared, dynamically dispatched transport instance.
///
/// ```
/// use transport::{DynTransport, Transport};
///
/// fn use_transport(t: DynTransport) {
///     println!("Using endpoint: {}", t.endpoint());
/// }
/// ```
pub type DynTransport = Arc<dyn Transport>;

/// Connection settings for a transport backend.
///
/// ```
/// use transport::TransportConfig;
///
/// let config = TransportConfig {
///     endpoint: "http://127.0.0.1:8080/".to_string(),
///     timeout_ms: Some(5_000),
/// };
/// assert_eq!(config.timeout_ms, Some(5_000));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransportConfig {
    /// Endpoint URL
    pub endpoint: String,
    /// Per-request timeout in milliseconds
    #[serde(default)]
    pub timeout_ms: Option<u64>,
}

/// Gets a random free port assigned by the OS.
///
/// This function binds to `127.0.0.1:0`, which causes the OS to assign
/// an available port. The listener is then dropped and the port number
/// is returned.
///
/// # Errors
///
/// Returns an error if binding to the address fails.
///
/// ```
/// use transport::get_random_free_port;
///
/// let port = get_random_free_port()?;
/// assert!(port > 0);
/// # Ok::<(), std::io::Error>(())
/// ```
pub fn get_random_free_port() -> std::io::Result<u16> {
    let listener = std::net::TcpListener::bind("127.0.0.1:0")?;
    Ok(listener.local_addr()?.port())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_from() {
        let err = serde_json::from_str::<serde_json::Value>("not-json")
            .expect_err("Expected JSON parsing to fail");
        let terr: TransportError = err.into();

        match terr {
            TransportError::Serialization(msg) => assert!(!msg.is_empty()),
            _ => panic!("expected Serialization error variant"),
        }
    }

    #[test]
    fn test_envelope_text() {
        let ok = Envelope::ok(json!({"exists": true}));
        assert!(ok.is_success());
        assert_eq!(ok.to_text(), r#"{"Response":{"exists":true},"Result":200}"#);
        assert_eq!(ok.error_message(), None);

        let err = Envelope::from_text(r#"{"Result":404,"Response":"Unknown operation: x"}"#)
            .expect("decodes");
        assert_eq!(err.error_message().as_deref(), Some("Unknown operation: x"));
    }

    #[test]
    fn test_envelope_rejects_non_envelopes() {
        assert!(matches!(
            Envelope::from_text(r#"{"result":1}"#),
            Err(TransportError::InvalidFormat(_))
        ));
        assert!(matches!(Envelope::from_text("<html>"), Err(TransportError::Serialization(_))));
    }

    #[test]
    fn test_build_request_sets_selector_and_version() {
        let params = json!({"Address": "ab", "Version": "old"}).as_object().cloned().expect("map");
        let request = build_request("checkWallet", "2.0.0-alpha.1", params);
        assert_eq!(selector_of(&request), Some("checkWallet"));
        assert_eq!(request[VERSION_FIELD], "2.0.0-alpha.1");
        assert_eq!(request["Address"], "ab");
    }

    #[test]
    fn test_get_random_free_port() {
        let port = get_random_free_port().expect("Should get a free port");

        assert!(port > 0);
    }
}
