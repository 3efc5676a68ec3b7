//! Parity drivers: one way of calling an endpoint against the mock
//!
//! A driver reports what a client decoded for one request. The reference
//! driver talks to the mock directly through the in-tree transport; command
//! drivers run a generated parity program and read its marker line.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use orbit_http::HttpTransport;
use schema::EndpointDefinition;
use serde::Deserialize;
use serde_json::{Map, Value};
use transport::{build_request, Transport, SELECTOR_FIELD, VERSION_FIELD};
use types::TargetLanguage;

use crate::error::{Result, TestgenError};
use crate::runner::run_command;
use crate::{MOCK_URL_ENV, PARITY_ENDPOINT_ENV, PARITY_MARKER, PARITY_REQUEST_ENV};

/// Name reported for a non-success code the endpoint does not declare.
pub const UNDECLARED_ERROR: &str = "UnexpectedResult";

/// What a driver observed for one call.
#[derive(Debug, Clone, PartialEq)]
pub enum DriverOutput {
    /// The decoded payload
    Value(Value),
    /// The typed error the call raised
    Error {
        /// Envelope result code
        code: i64,
        /// Declared error name
        name: String,
    },
}

/// Calls one endpoint and reports the outcome.
#[async_trait]
pub trait SdkDriver: Send + Sync {
    /// Driver name used in reports.
    fn name(&self) -> String;

    /// Call `endpoint` with the wire fields of `request` against the mock at `mock_url`.
    ///
    /// [`TestgenError::ToolchainMissing`] means the call could not be made at
    /// all; the parity runner counts it as skipped.
    async fn call(&self, endpoint: &EndpointDefinition, request: &Value, mock_url: &str) -> Result<DriverOutput>;
}

#[derive(Deserialize)]
struct MarkerLine {
    ok: bool,
    #[serde(default)]
    value: Value,
    #[serde(default)]
    code: i64,
    #[serde(default)]
    name: String,
}

/// Read the last marker line of a driver's stdout.
pub fn parse_marker(stdout: &str) -> Option<std::result::Result<DriverOutput, serde_json::Error>> {
    let line = stdout.lines().rev().find_map(|line| line.trim_end().strip_prefix(PARITY_MARKER))?;
    Some(serde_json::from_str::<MarkerLine>(line).map(|marker| {
        if marker.ok {
            DriverOutput::Value(marker.value)
        } else {
            DriverOutput::Error { code: marker.code, name: marker.name }
        }
    }))
}

/// Runs a generated parity driver of one target.
#[derive(Debug, Clone)]
pub struct CommandDriver {
    target: TargetLanguage,
    dir: PathBuf,
    timeout: Duration,
}

impl CommandDriver {
    /// Driver for the `target` directory under `out_dir`.
    pub fn new(target: TargetLanguage, out_dir: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self { target, dir: out_dir.into().join(target.as_str()), timeout }
    }

    fn failure(&self, message: impl Into<String>) -> TestgenError {
        TestgenError::Driver { driver: self.name(), message: message.into() }
    }
}

#[async_trait]
impl SdkDriver for CommandDriver {
    fn name(&self) -> String { self.target.as_str().to_string() }

    async fn call(&self, endpoint: &EndpointDefinition, request: &Value, mock_url: &str) -> Result<DriverOutput> {
        if !self.dir.join(self.target.driver_file()).is_file() {
            return Err(self.failure(format!("parity driver not generated in {}", self.dir.display())));
        }
        let args = self.target.driver_command();
        let dir = self.dir.clone();
        let timeout = self.timeout;
        let env = vec![
            (MOCK_URL_ENV, mock_url.to_string()),
            (PARITY_ENDPOINT_ENV, endpoint.name.clone()),
            (PARITY_REQUEST_ENV, request.to_string()),
        ];
        let outcome = tokio::task::spawn_blocking(move || run_command(&args, &dir, &env, timeout)).await??;
        let Some(outcome) = outcome else {
            return Err(TestgenError::ToolchainMissing {
                driver: self.name(),
                toolchain: self.target.toolchain().to_string(),
            });
        };
        match parse_marker(&outcome.stdout) {
            Some(parsed) => Ok(parsed?),
            None if outcome.success() => Err(self.failure("no result line printed")),
            None => Err(self.failure(outcome.describe())),
        }
    }
}

/// Calls the mock through the in-tree HTTP transport.
#[derive(Debug, Clone)]
pub struct TransportDriver {
    wire_version: String,
}

impl TransportDriver {
    /// Reference driver speaking `wire_version`.
    pub fn new(wire_version: impl Into<String>) -> Self { Self { wire_version: wire_version.into() } }
}

#[async_trait]
impl SdkDriver for TransportDriver {
    fn name(&self) -> String { "reference".to_string() }

    async fn call(&self, endpoint: &EndpointDefinition, request: &Value, mock_url: &str) -> Result<DriverOutput> {
        let params: Map<String, Value> = request
            .as_object()
            .into_iter()
            .flatten()
            .filter(|(key, _)| key.as_str() != SELECTOR_FIELD && key.as_str() != VERSION_FIELD)
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        let body = build_request(&endpoint.dispatch_key, &self.wire_version, params);
        let envelope = HttpTransport::new(mock_url).send(&body).await?;
        if envelope.is_success() {
            return Ok(DriverOutput::Value(envelope.response));
        }
        let name = endpoint
            .errors
            .iter()
            .find(|e| e.code == envelope.result)
            .map_or_else(|| UNDECLARED_ERROR.to_string(), |e| e.name.clone());
        Ok(DriverOutput::Error { code: envelope.result, name })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_parse_marker_takes_the_last_line() {
        let stdout = format!("noise\n{}{{\"ok\":true,\"value\":1}}\n{}{{\"ok\":true,\"value\":{{\"a\":2}}}}\n", PARITY_MARKER, PARITY_MARKER);
        let parsed = parse_marker(&stdout).expect("marker").expect("json");
        assert_eq!(parsed, DriverOutput::Value(json!({"a": 2})));
    }

    #[test]
    fn test_parse_marker_error() {
        let stdout = format!("{}{{\"ok\":false,\"code\":118,\"name\":\"WalletNotFound\"}}", PARITY_MARKER);
        let parsed = parse_marker(&stdout).expect("marker").expect("json");
        assert_eq!(parsed, DriverOutput::Error { code: 118, name: "WalletNotFound".into() });
    }

    #[test]
    fn test_parse_marker_absent_or_garbled() {
        assert!(parse_marker("nothing here\n").is_none());
        assert!(parse_marker(&format!("{}not json", PARITY_MARKER)).expect("marker").is_err());
    }
}
