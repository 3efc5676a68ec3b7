//! Test generation and execution errors

use thiserror::Error;

/// Errors raised while rendering or running tests.
#[derive(Debug, Error)]
pub enum TestgenError {
    /// Formatting a suite failed
    #[error("render: {0}")]
    Render(#[from] std::fmt::Error),

    /// Filesystem or process I/O
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding or decoding
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),

    /// The mock server failed
    #[error(transparent)]
    Mock(#[from] mock::MockError),

    /// The reference transport failed
    #[error(transparent)]
    Transport(#[from] transport::TransportError),

    /// A parity driver misbehaved
    #[error("driver {driver}: {message}")]
    Driver {
        /// Driver name
        driver: String,
        /// What went wrong
        message: String,
    },

    /// The toolchain a parity driver runs on is not installed
    #[error("driver {driver}: {toolchain} not installed")]
    ToolchainMissing {
        /// Driver name
        driver: String,
        /// Toolchain the driver needs
        toolchain: String,
    },

    /// A background task did not complete
    #[error("task: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Result type for test generation and execution
pub type Result<T> = std::result::Result<T, TestgenError>;
