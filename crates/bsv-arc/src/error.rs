//! Error types for ARC operations.
//!
//! These are transport-level failures. Every public broadcast or status call
//! folds them into a [`BroadcastFailure`] with an HTTP-style code, so callers
//! only ever see one failure shape.

use std::time::Duration;

use bsv_transaction::BroadcastFailure;

/// Description used for refused connections and 503 responses.
pub const CONNECT_FAILURE: &str = "Failed to connect to ARC service";

/// Errors that can occur when talking to the ARC API.
#[derive(Debug, thiserror::Error)]
pub enum ArcError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Failed to serialize or deserialize data.
    #[error("serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// No async runtime could be started for a blocking call.
    #[error("runtime error: {0}")]
    Runtime(#[from] std::io::Error),
}

impl ArcError {
    /// Classify into a failure value.
    ///
    /// Timeouts become `408` with `"{action} timed out after {secs} seconds"`,
    /// connection failures become `503`, everything else is `500` with the
    /// error text.
    pub fn into_failure(self, action: &str, timeout: Duration) -> BroadcastFailure {
        match &self {
            ArcError::HttpError(e) if e.is_timeout() => BroadcastFailure::new(
                "408",
                format!("{} timed out after {} seconds", action, timeout.as_secs()),
            ),
            ArcError::HttpError(e) if e.is_connect() => BroadcastFailure::new("503", CONNECT_FAILURE),
            _ => BroadcastFailure::new("500", self.to_string()),
        }
    }
}
