use crate::broadcaster::BroadcastFailure;

/// Error types for transaction operations.
#[derive(Debug, thiserror::Error)]
pub enum TransactionError {
    /// The transaction structure is invalid (e.g. an index out of range).
    #[error("invalid transaction: {0}")]
    InvalidTransaction(String),
    /// Malformed transaction bytes: truncated stream, trailing data, bad hex.
    #[error("deserialization error: {0}")]
    DeserializationError(String),
    /// A script type was asked for something its shape does not support.
    #[error("unsupported output type: {0}")]
    UnsupportedOutputType(String),
    /// Change insertion found neither a change address nor a P2PKH input.
    #[error("no change destination: pass an address or spend a P2PKH input")]
    NoChangeDestination,
    /// The fee paid is below the estimated fee.
    #[error("require {required} satoshi but only {available}")]
    InsufficientFunds {
        /// Total outputs plus the estimated fee.
        required: u64,
        /// Total inputs.
        available: u64,
    },
    /// An error occurred while signing an input.
    #[error("signing error: {0}")]
    SigningError(String),
    /// The broadcaster rejected the transaction.
    #[error("broadcast failed: {0}")]
    Broadcast(#[from] BroadcastFailure),
    /// An underlying script error (forwarded from `bsv-script`).
    #[error("script error: {0}")]
    Script(#[from] bsv_script::ScriptError),
    /// An underlying primitives error (forwarded from `bsv-primitives`).
    #[error("primitives error: {0}")]
    Primitives(#[from] bsv_primitives::PrimitivesError),
}
