//! Script types and the capability each offers.
//!
//! Every output and input carries a [`ScriptType`] tag. The tag decides how a
//! locking script is built, how an unlocking script is assembled from
//! signatures, and how large that unlocking script will be before signing.

pub mod op_return;
pub mod p2pkh;

use bsv_primitives::ec::{PrivateKey, Signature};
use bsv_script::{Address, Network, Script};

use crate::TransactionError;

/// Shape of a locking script.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ScriptType {
    /// Pay to public key hash.
    P2PKH,
    /// Unspendable data carrier (`OP_FALSE OP_RETURN <data>...`).
    OpReturn,
    /// Any other script. Its unlocking script must be supplied explicitly.
    #[default]
    Unknown,
}

/// Inputs to [`ScriptType::locking`].
#[derive(Clone, Copy, Debug)]
pub enum LockingParams<'a> {
    /// A base58check P2PKH address, checked against `network`.
    Address {
        /// Address string.
        address: &'a str,
        /// Network the address must belong to.
        network: Network,
    },
    /// An already decoded address.
    ParsedAddress(&'a Address),
    /// Data chunks for a data carrier.
    Data(&'a [&'a [u8]]),
}

impl ScriptType {
    /// Tag a locking script by its shape.
    pub fn classify(script: &Script) -> Self {
        if script.is_p2pkh() {
            ScriptType::P2PKH
        } else if script.is_data() {
            ScriptType::OpReturn
        } else {
            ScriptType::Unknown
        }
    }

    /// Build a locking script of this type.
    pub fn locking(&self, params: LockingParams<'_>) -> Result<Script, TransactionError> {
        match (self, params) {
            (ScriptType::P2PKH, LockingParams::Address { address, network }) => {
                p2pkh::lock_to_string(address, network)
            }
            (ScriptType::P2PKH, LockingParams::ParsedAddress(address)) => Ok(p2pkh::lock(address)),
            (ScriptType::OpReturn, LockingParams::Data(chunks)) => op_return::lock(chunks),
            (script_type, params) => Err(TransactionError::UnsupportedOutputType(format!(
                "{:?} cannot lock with {:?}",
                script_type, params
            ))),
        }
    }

    /// Build the unlocking script from one signature per key.
    pub fn unlocking(
        &self,
        signatures: &[Signature],
        keys: &[PrivateKey],
        sighash: u32,
    ) -> Result<Script, TransactionError> {
        match self {
            ScriptType::P2PKH => p2pkh::unlock(signatures, keys, sighash),
            other => Err(TransactionError::UnsupportedOutputType(format!(
                "{:?} inputs need an explicit unlocking script",
                other
            ))),
        }
    }

    /// Upper bound on the unlocking script length, before signing.
    pub fn estimated_unlocking_byte_length(
        &self,
        keys: &[PrivateKey],
    ) -> Result<usize, TransactionError> {
        match self {
            ScriptType::P2PKH => Ok(p2pkh::estimated_unlocking_byte_length(keys)),
            other => Err(TransactionError::UnsupportedOutputType(format!(
                "cannot estimate unlocking length of {:?} inputs",
                other
            ))),
        }
    }
}
