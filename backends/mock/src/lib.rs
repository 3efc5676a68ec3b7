#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]

//! Mock Server
//!
//! A stateless HTTP server that replays the canonical example response of
//! every operation. Requests are routed on a single path by the operation
//! selector carried in the body; the served text is the literal text stored
//! in the [`RouteTable`], so it cannot drift from the catalog.
//!
//! - `POST /` dispatches on the `Operation` field
//! - `GET /health` answers `{"status":"ok"}`
//! - `OPTIONS /` answers CORS preflight

use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, HeaderName, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::Router;
use serde_json::Value;
use thiserror::Error;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use transport::{selector_of, Envelope, RouteTable, VERSION_FIELD};

/// Errors that can occur while running the mock server
#[derive(Debug, Error)]
pub enum MockError {
    /// The listening socket could not be bound
    #[error("cannot bind mock server to {addr}: {source}")]
    Bind {
        /// Requested address
        addr: SocketAddr,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The server task failed
    #[error("mock server failed: {0}")]
    Server(String),
}

/// Request handling options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MockOptions {
    /// Reject requests with a foreign `Version` or a missing required parameter
    pub strict: bool,
}

/// The routing core, independent of the HTTP layer.
#[derive(Debug, Clone)]
pub struct MockState {
    table: RouteTable,
    options: MockOptions,
}

impl MockState {
    /// Serve `table` with `options`.
    pub fn new(table: RouteTable, options: MockOptions) -> Self { Self { table, options } }

    /// The routed table.
    pub fn table(&self) -> &RouteTable { &self.table }

    /// Answer one request body with envelope text.
    pub fn dispatch(&self, body: &[u8]) -> String {
        let request: Value = match serde_json::from_slice(body) {
            Ok(v @ Value::Object(_)) => v,
            Ok(_) => return Envelope::error(400, "Malformed request: expected a JSON object").to_text(),
            Err(e) => return Envelope::error(400, format!("Malformed request: {}", e)).to_text(),
        };

        let Some(selector) = selector_of(&request) else {
            return Envelope::error(400, "Malformed request: missing Operation").to_text();
        };
        let Some(route) = self.table.get(selector) else {
            tracing::debug!(operation = selector, "unknown operation");
            return Envelope::error(404, format!("Unknown operation: {}", selector)).to_text();
        };

        if self.options.strict {
            let version = request.get(VERSION_FIELD).and_then(Value::as_str).unwrap_or("");
            if version != self.table.wire_version() {
                return Envelope::error(
                    400,
                    format!(
                        "Version mismatch: expected {}, got {}",
                        self.table.wire_version(),
                        version
                    ),
                )
                .to_text();
            }
            if let Some(missing) =
                route.required_params.iter().find(|p| request.get(p.as_str()).map_or(true, Value::is_null))
            {
                return Envelope::error(400, format!("Missing required parameter: {}", missing))
                    .to_text();
            }
        }

        tracing::debug!(operation = selector, "served canonical response");
        route.response.clone()
    }
}

const CORS_HEADERS: [(HeaderName, &str); 3] = [
    (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
    (header::ACCESS_CONTROL_ALLOW_METHODS, "POST, GET, OPTIONS"),
    (header::ACCESS_CONTROL_ALLOW_HEADERS, "Content-Type"),
];

fn json_response(text: String) -> impl IntoResponse {
    (StatusCode::OK, CORS_HEADERS, [(header::CONTENT_TYPE, "application/json")], text)
}

async fn handle_call(State(state): State<Arc<MockState>>, body: Bytes) -> impl IntoResponse {
    json_response(state.dispatch(&body))
}

async fn handle_health() -> impl IntoResponse { json_response(r#"{"status":"ok"}"#.to_string()) }

async fn handle_preflight() -> impl IntoResponse { (StatusCode::NO_CONTENT, CORS_HEADERS) }

async fn handle_unknown_path() -> impl IntoResponse {
    json_response(Envelope::error(404, "Unknown path").to_text())
}

/// Create the HTTP routes over `state`.
pub fn router(state: Arc<MockState>) -> Router {
    Router::new()
        .route("/", post(handle_call).options(handle_preflight))
        .route("/health", get(handle_health))
        .fallback(handle_unknown_path)
        .with_state(state)
}

/// A running mock server.
#[derive(Debug)]
pub struct MockHandle {
    addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
    task: JoinHandle<std::io::Result<()>>,
}

impl MockHandle {
    /// Bound address.
    pub fn addr(&self) -> SocketAddr { self.addr }

    /// Base URL SDKs post to.
    pub fn url(&self) -> String { format!("http://{}/", self.addr) }

    /// Stop accepting connections and wait for the server task.
    pub async fn shutdown(mut self) -> Result<(), MockError> {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        match (&mut self.task).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(MockError::Server(e.to_string())),
            Err(e) => Err(MockError::Server(e.to_string())),
        }
    }
}

/// Entry point for starting mock servers.
pub struct MockServer;

impl MockServer {
    /// Bind `addr` (port 0 picks a free port) and serve `table` in the background.
    pub async fn start(
        table: RouteTable,
        options: MockOptions,
        addr: SocketAddr,
    ) -> Result<MockHandle, MockError> {
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|source| MockError::Bind { addr, source })?;
        let bound = listener.local_addr().map_err(|source| MockError::Bind { addr, source })?;

        let routes = table.len();
        let app = router(Arc::new(MockState::new(table, options)));
        let (tx, rx) = oneshot::channel::<()>();
        let server = axum::serve(listener, app).with_graceful_shutdown(async {
            let _ = rx.await;
        });
        let task = tokio::spawn(async move { server.await });

        tracing::info!(%bound, routes, strict = options.strict, "mock server listening");
        Ok(MockHandle { addr: bound, shutdown: Some(tx), task })
    }

    /// Start on `127.0.0.1` with an OS-assigned port.
    pub async fn start_local(
        table: RouteTable,
        options: MockOptions,
    ) -> Result<MockHandle, MockError> {
        Self::start(table, options, SocketAddr::from(([127, 0, 0, 1], 0))).await
    }
}

#[cfg(test)]
mod tests {
    use transport::MockRoute;

    use super::*;

    fn state(strict: bool) -> MockState {
        let table = RouteTable::new(
            "2.0.0-alpha.1",
            "hash",
            vec![MockRoute {
                dispatch_key: "checkWallet".to_string(),
                endpoint: "checkWallet".to_string(),
                response: r#"{"Response":{"exists":true},"Result":200}"#.to_string(),
                required_params: vec!["Address".to_string(), "Blockchain".to_string()],
            }],
        );
        MockState::new(table, MockOptions { strict })
    }

    fn result_of(text: &str) -> i64 { Envelope::from_text(text).expect("envelope").result }

    #[test]
    fn test_serves_literal_text() {
        let text = state(false).dispatch(br#"{"Operation":"checkWallet"}"#);
        assert_eq!(text, r#"{"Response":{"exists":true},"Result":200}"#);
    }

    #[test]
    fn test_unknown_and_malformed() {
        let s = state(false);
        let unknown = Envelope::from_text(&s.dispatch(br#"{"Operation":"nope"}"#)).expect("env");
        assert_eq!(unknown.result, 404);
        assert_eq!(unknown.error_message().as_deref(), Some("Unknown operation: nope"));
        assert_eq!(result_of(&s.dispatch(b"not json")), 400);
        assert_eq!(result_of(&s.dispatch(b"[1,2]")), 400);
        assert_eq!(result_of(&s.dispatch(br#"{"Version":"2.0.0-alpha.1"}"#)), 400);
    }

    #[test]
    fn test_strict_mode() {
        let s = state(true);
        let wrong_version = br#"{"Operation":"checkWallet","Version":"1.0.0","Address":"a","Blockchain":"b"}"#;
        assert_eq!(result_of(&s.dispatch(wrong_version)), 400);
        let missing = br#"{"Operation":"checkWallet","Version":"2.0.0-alpha.1","Address":"a"}"#;
        let env = Envelope::from_text(&s.dispatch(missing)).expect("env");
        assert_eq!(env.error_message().as_deref(), Some("Missing required parameter: Blockchain"));
        let ok = br#"{"Operation":"checkWallet","Version":"2.0.0-alpha.1","Address":"a","Blockchain":"b"}"#;
        assert_eq!(result_of(&s.dispatch(ok)), 200);
    }
}
