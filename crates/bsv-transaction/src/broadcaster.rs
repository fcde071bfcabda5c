//! Transaction broadcasting interfaces.
//!
//! A broadcaster takes serialized transaction bytes and either accepts them
//! with a txid or fails with a code and description. Blocking and
//! non-blocking flavours share the same result types.

use std::fmt;
use std::future::Future;

/// Result of a successful broadcast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BroadcastSuccess {
    /// The transaction ID returned by the network.
    pub txid: String,
    /// Human-readable status message from the broadcaster.
    pub message: String,
}

/// Result of a failed broadcast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BroadcastFailure {
    /// Machine-readable error code, usually an HTTP status.
    pub code: String,
    /// Human-readable description of the failure.
    pub description: String,
}

impl BroadcastFailure {
    /// Build a failure from any code and description.
    pub fn new(code: impl Into<String>, description: impl Into<String>) -> Self {
        BroadcastFailure {
            code: code.into(),
            description: description.into(),
        }
    }
}

impl fmt::Display for BroadcastFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.description, self.code)
    }
}

impl std::error::Error for BroadcastFailure {}

/// Blocking broadcaster.
pub trait Broadcaster {
    /// Submit raw transaction bytes.
    fn broadcast(&self, raw_tx: &[u8]) -> Result<BroadcastSuccess, BroadcastFailure>;
}

/// Non-blocking broadcaster.
pub trait AsyncBroadcaster {
    /// Submit raw transaction bytes, yielding while the network responds.
    fn broadcast_async(
        &self,
        raw_tx: &[u8],
    ) -> impl Future<Output = Result<BroadcastSuccess, BroadcastFailure>> + Send;
}
