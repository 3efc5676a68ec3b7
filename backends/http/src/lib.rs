#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]

//! # `orbit-http`: HTTP Transport Backend
//!
//! This crate provides a concrete HTTP-based implementation of the
//! [`transport::Transport`] trait speaking the Circular wire contract:
//! one POST of a JSON body per call, answered by a `{Result, Response}`
//! envelope.
//!
//! ## Example
//! ```no_run
//! use orbit_http::HttpTransport;
//! use serde_json::{json, Map};
//! use transport::{build_request, Transport};
//!
//! # async fn demo() -> Result<(), transport::TransportError> {
//! let transport = HttpTransport::new("http://127.0.0.1:8080/");
//! let request = build_request("getBlockCount", "2.0.0-alpha.1", Map::new());
//! let envelope = transport.send(&request).await?;
//! println!("{:#?}", envelope);
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use transport::{Envelope, Transport, TransportConfig, TransportError};

/// A concrete implementation of the [`Transport`] trait using HTTP.
///
/// `HttpTransport` performs no schema validation; it posts the request body
/// and decodes the envelope. Errors at any stage (HTTP, body read, JSON
/// parsing, envelope shape) are normalized into [`TransportError`] variants.
#[derive(Clone)]
pub struct HttpTransport {
    /// The underlying HTTP client used to perform requests.
    client: reqwest::Client,
    /// The full URL of the endpoint (e.g. `http://127.0.0.1:8080/`).
    url: String,
}

impl HttpTransport {
    /// Constructs a new `HttpTransport` targeting the provided URL.
    ///
    /// # Example
    /// ```
    /// use orbit_http::HttpTransport;
    /// use transport::Transport;
    ///
    /// let transport = HttpTransport::new("http://127.0.0.1:8080/");
    /// assert_eq!(transport.endpoint(), "http://127.0.0.1:8080/");
    /// ```
    pub fn new(url: impl Into<String>) -> Self {
        Self { client: reqwest::Client::new(), url: url.into() }
    }

    /// Constructs a transport whose requests time out after `timeout`.
    pub fn with_timeout(url: impl Into<String>, timeout: Duration) -> Result<Self, TransportError> {
        let url_string = url.into();
        logging::trace("HTTP", &format!("→ initializing HTTP transport for {}", url_string));
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Http(e.to_string()))?;
        Ok(Self { client, url: url_string })
    }

    /// Constructs a transport from a [`TransportConfig`].
    pub fn from_config(config: &TransportConfig) -> Result<Self, TransportError> {
        match config.timeout_ms {
            Some(ms) => Self::with_timeout(&config.endpoint, Duration::from_millis(ms)),
            None => Ok(Self::new(&config.endpoint)),
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    /// Posts `request` and decodes the answer envelope.
    ///
    /// # Errors
    /// - [`TransportError::Http`] if the request fails or the status is not 2xx
    /// - [`TransportError::Serialization`] if the body is not JSON
    /// - [`TransportError::InvalidFormat`] if the body is not an envelope
    async fn send(&self, request: &Value) -> Result<Envelope, TransportError> {
        logging::trace("HTTP", &format!("→ POST {} ({})", self.url, request));

        let resp = self.client.post(&self.url).json(request).send().await.map_err(|e| {
            tracing::error!("HTTP Transport - Request failed: {}", e);
            TransportError::Http(e.to_string())
        })?;

        let status = resp.status();
        let text = resp.text().await.map_err(|e| {
            tracing::error!("HTTP Transport - Failed to read body: {}", e);
            TransportError::Serialization(e.to_string())
        })?;

        if !status.is_success() {
            tracing::error!("HTTP Transport - status {} from {}", status, self.url);
            return Err(TransportError::Http(format!("status {} (body: {})", status, text)));
        }

        Envelope::from_text(&text)
    }

    /// Returns the configured endpoint URL.
    fn endpoint(&self) -> &str { &self.url }
}
