//! BSV Blockchain SDK - Transaction building, signing, and serialization.
//!
//! Provides the Transaction type with inputs and outputs, the BIP-143 FORKID
//! signature hash, signing through script-type templates, fee estimation
//! and change insertion, and the broadcaster contract.

pub mod broadcaster;
pub mod config;
pub mod fee;
pub mod input;
pub mod output;
pub mod sighash;
pub mod template;
pub mod transaction;
pub mod unspent;

mod error;
pub use broadcaster::{AsyncBroadcaster, BroadcastFailure, BroadcastSuccess, Broadcaster};
pub use config::TransactionConfig;
pub use error::TransactionError;
pub use input::{Outpoint, TxInput};
pub use output::TxOutput;
pub use template::{LockingParams, ScriptType};
pub use transaction::Transaction;
pub use unspent::Unspent;

#[cfg(test)]
mod tests;
