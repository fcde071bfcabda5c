#![deny(missing_docs)]

//! # bsv-arc
//!
//! ARC (Authoritative Response Component) HTTP client for broadcasting
//! BSV transactions and querying their status.
//!
//! [`ArcClient`] implements both broadcaster traits from `bsv-transaction`,
//! so it can be handed straight to `Transaction::broadcast` or
//! `Transaction::broadcast_async`. Every outcome, including transport
//! errors, comes back as a success or a `BroadcastFailure` value.
//!
//! # Example
//!
//! ```no_run
//! use bsv_arc::{ArcClient, ArcConfig};
//!
//! let client = ArcClient::new(ArcConfig::taal("my-key"));
//! ```

pub mod client;
pub mod error;
pub mod status;
pub mod types;


pub use client::{default_broadcaster, default_deployment_id, ArcClient};
pub use error::ArcError;
pub use status::{categorize_status, StatusCategory};
pub use types::{ArcConfig, ArcResponse, ArcStatus, TxStatusReport};
