//! Error types for the remote configuration store.

use thiserror::Error;

/// Error type for HTTP operations.
///
/// Describes what went wrong at the transport level. Reconciliation never
/// retries these; retry is the caller's call.
#[derive(Debug, Error)]
pub enum HttpError {
    /// Network connection failed.
    ///
    /// This includes DNS resolution failures, connection refused,
    /// TLS failures and other network-level errors.
    #[error("Connection error: {0}")]
    Connection(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Request timed out.
    ///
    /// The server did not respond within the configured timeout period.
    #[error("Request timed out")]
    Timeout,

    /// The provided URL is invalid.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

/// Error type for [`ConfigStore`](super::ConfigStore) calls.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The server answered with a non-success status.
    #[error("HTTP {status}: {body}")]
    Status {
        /// Response status
        status: http::StatusCode,
        /// Response body, verbatim
        body: String,
    },

    /// The request never got an answer.
    #[error(transparent)]
    Transport(#[from] HttpError),

    /// A request or response body was not valid JSON of the expected shape.
    #[error("Invalid JSON body: {0}")]
    InvalidBody(#[from] serde_json::Error),
}

impl StoreError {
    /// Returns true for a 404 response.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Status { status, .. } if *status == http::StatusCode::NOT_FOUND)
    }
}
