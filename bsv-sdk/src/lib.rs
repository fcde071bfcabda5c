#![deny(missing_docs)]

//! BSV Blockchain SDK.
//!
//! Re-exports the component crates for single-crate usage: keys and
//! hashing, scripts and addresses, transaction building and signing, and
//! the ARC broadcaster.
//!
//! ```no_run
//! use bsv_sdk::{default_broadcaster, Transaction};
//!
//! # fn run(mut tx: Transaction) -> Result<(), bsv_sdk::TransactionError> {
//! tx.add_change(None)?.sign(false)?;
//! let sent = tx.broadcast(&default_broadcaster(false, None), true)?;
//! println!("{} {}", sent.txid, sent.message);
//! # Ok(())
//! # }
//! ```

pub use bsv_arc as arc;
pub use bsv_primitives as primitives;
pub use bsv_script as script;
pub use bsv_transaction as transaction;

pub use bsv_arc::{default_broadcaster, ArcClient, ArcConfig};
pub use bsv_primitives::ec::{PrivateKey, PublicKey};
pub use bsv_script::{Address, Network, Script};
pub use bsv_transaction::{
    Transaction, TransactionConfig, TransactionError, TxInput, TxOutput, Unspent,
};
