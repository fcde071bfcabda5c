//! A spendable output record.

use bsv_primitives::chainhash::Hash;
use bsv_primitives::ec::PrivateKey;
use bsv_script::Script;

use crate::template::ScriptType;

/// An unspent output together with what is needed to spend it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Unspent {
    /// Id of the transaction holding the output.
    pub txid: Hash,
    /// Index of the output.
    pub vout: u32,
    /// Satoshis held.
    pub value: u64,
    /// The output's locking script.
    pub locking_script: Script,
    /// Shape of `locking_script`.
    pub script_type: ScriptType,
    /// Keys able to unlock the output.
    pub private_keys: Vec<PrivateKey>,
}

impl Unspent {
    /// Record an output; the script type is inferred from the script.
    pub fn new(txid: Hash, vout: u32, value: u64, locking_script: Script) -> Self {
        Unspent {
            txid,
            vout,
            value,
            script_type: ScriptType::classify(&locking_script),
            locking_script,
            private_keys: Vec::new(),
        }
    }

    /// Attach the keys that sign the input built from this record.
    pub fn with_private_keys(mut self, keys: Vec<PrivateKey>) -> Self {
        self.private_keys = keys;
        self
    }
}
