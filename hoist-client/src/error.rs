//! Error types for the Hoist client

use thiserror::Error;

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when talking to the build server
///
/// "Not found" is deliberately absent: resolution operations return
/// `Ok(None)` or empty collections for missing items, and callers decide
/// exit codes and messaging. Only genuinely exceptional conditions are
/// represented here, and none of them is retried automatically.
#[derive(Debug, Error)]
pub enum Error {
    /// HTTP request failed outright
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Server returned a non-success status where one was required
    #[error("API error (status {status}): {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Error message from the server
        message: String,
    },

    /// Trigger was accepted but no usable queue location came back
    #[error("could not correlate trigger with a queue item: {0}")]
    Correlation(String),

    /// Search pattern failed to compile; aborts the whole search
    #[error("malformed search pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// Follow loop hit missing or invalid response metadata
    #[error("log tailing failed: {0}")]
    Tail(String),

    /// Response body did not parse as the expected shape
    #[error("failed to parse response: {0}")]
    Parse(String),

    /// Local file I/O failed while saving logs
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create an API error from status code and message
    pub fn api_error(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Check if this error is a client error (4xx status)
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Api { status, .. } if *status >= 400 && *status < 500)
    }

    /// Check if this error is a server error (5xx status)
    pub fn is_server_error(&self) -> bool {
        matches!(self, Self::Api { status, .. } if *status >= 500)
    }
}
