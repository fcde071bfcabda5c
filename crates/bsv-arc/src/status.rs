//! Grouping of ARC `txStatus` values into the few outcomes callers act on.

use std::fmt;

use crate::types::TxStatusReport;

/// What a transaction status means for the sender.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusCategory {
    /// Still moving through ARC and the network.
    Progressing,
    /// Included in a block.
    Mined,
    /// In the mempool without conflicts, or mined in a stale block.
    ZeroConfirmation,
    /// A double spend was attempted or competing transactions exist.
    Warning,
    /// Will not be mined.
    Rejected,
    /// A status this library does not know.
    UnknownTxStatus(String),
    /// The report carried no status.
    Error,
}

impl fmt::Display for StatusCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusCategory::Progressing => f.write_str("progressing"),
            StatusCategory::Mined => f.write_str("mined"),
            StatusCategory::ZeroConfirmation => f.write_str("0confirmation"),
            StatusCategory::Warning => f.write_str("warning"),
            StatusCategory::Rejected => f.write_str("rejected"),
            StatusCategory::UnknownTxStatus(status) => write!(f, "unknown_txStatus: {}", status),
            StatusCategory::Error => f.write_str("error"),
        }
    }
}

/// Categorize a status report.
///
/// `SEEN_ON_NETWORK` is a warning when the report lists competing
/// transactions and a zero-confirmation success otherwise.
pub fn categorize_status(report: &TxStatusReport) -> StatusCategory {
    let Some(status) = report.tx_status.as_deref() else {
        return StatusCategory::Error;
    };
    match status {
        "UNKNOWN"
        | "QUEUED"
        | "RECEIVED"
        | "STORED"
        | "ANNOUNCED_TO_NETWORK"
        | "REQUESTED_BY_NETWORK"
        | "SENT_TO_NETWORK"
        | "ACCEPTED_BY_NETWORK" => StatusCategory::Progressing,
        "MINED" => StatusCategory::Mined,
        "MINED_IN_STALE_BLOCK" => StatusCategory::ZeroConfirmation,
        "DOUBLE_SPEND_ATTEMPTED" => StatusCategory::Warning,
        "SEEN_ON_NETWORK" => {
            let competing = report
                .competing_txs
                .as_ref()
                .is_some_and(|txs| !txs.is_empty());
            if competing {
                StatusCategory::Warning
            } else {
                StatusCategory::ZeroConfirmation
            }
        }
        "ERROR" | "REJECTED" | "SEEN_IN_ORPHAN_MEMPOOL" => StatusCategory::Rejected,
        other => StatusCategory::UnknownTxStatus(other.to_string()),
    }
}
