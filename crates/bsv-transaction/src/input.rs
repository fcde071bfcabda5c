//! Transaction input spending a previous output.
//!
//! Besides the serialized fields, an input carries what signing needs but the
//! wire format omits: the value and locking script of the output it spends,
//! that script's type, the sighash flags, and the keys to sign with.

use std::fmt;

use bsv_primitives::chainhash::Hash;
use bsv_primitives::ec::PrivateKey;
use bsv_primitives::util::{BsvReader, BsvWriter, VarInt};
use bsv_script::Script;

use crate::sighash::SIGHASH_ALL_FORKID;
use crate::template::ScriptType;
use crate::unspent::Unspent;
use crate::TransactionError;

/// Default sequence number indicating a finalized input (no relative lock-time).
pub const DEFAULT_SEQUENCE_NUMBER: u32 = 0xFFFF_FFFF;

/// Serialized size of an input without its unlocking script, plus the one
/// byte varint every script under 0xfd bytes needs.
pub const INPUT_BASE_LEN: usize = 41;

/// Reference to a previous output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Outpoint {
    /// Previous transaction id, in internal byte order.
    pub txid: Hash,
    /// Output index within that transaction.
    pub vout: u32,
}

impl Outpoint {
    /// Reference output `vout` of the transaction with id `txid`.
    pub fn new(txid: Hash, vout: u32) -> Self {
        Outpoint { txid, vout }
    }

    /// From a display-order (byte-reversed) txid hex string.
    pub fn from_hex(txid: &str, vout: u32) -> Result<Self, TransactionError> {
        Ok(Outpoint {
            txid: Hash::from_hex(txid)?,
            vout,
        })
    }

    /// Append `txid || vout` as it appears on the wire.
    pub fn write_to(&self, writer: &mut BsvWriter) {
        writer.write_bytes(self.txid.as_bytes());
        writer.write_u32_le(self.vout);
    }
}

impl fmt::Display for Outpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.txid, self.vout)
    }
}

/// A single input in a BSV transaction.
///
/// # Wire format
///
/// | Field              | Size             |
/// |--------------------|------------------|
/// | txid               | 32 bytes         |
/// | vout               | 4 bytes (LE)     |
/// | script length      | VarInt           |
/// | unlocking_script   | variable         |
/// | sequence           | 4 bytes (LE)     |
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TxInput {
    /// The output being spent.
    pub outpoint: Outpoint,

    /// Satoshis held by the spent output. Committed to by the sighash digest.
    pub value: u64,

    /// Locking script of the spent output, used as the digest's script code.
    pub locking_script: Script,

    /// `None` until the input is signed.
    pub unlocking_script: Option<Script>,

    /// Sequence number. Defaults to `0xFFFFFFFF` (finalized).
    pub sequence: u32,

    /// Sighash flags for this input's signature.
    pub sighash: u32,

    /// Type of `locking_script`, selecting how the input is unlocked.
    pub script_type: ScriptType,

    /// Keys that sign this input, in script order.
    pub private_keys: Vec<PrivateKey>,
}

impl TxInput {
    /// Spend `outpoint`, holding `value` under `locking_script`.
    /// The script type is inferred from the script.
    pub fn new(outpoint: Outpoint, value: u64, locking_script: Script) -> Self {
        TxInput {
            outpoint,
            value,
            script_type: ScriptType::classify(&locking_script),
            locking_script,
            unlocking_script: None,
            sequence: DEFAULT_SEQUENCE_NUMBER,
            sighash: SIGHASH_ALL_FORKID,
            private_keys: Vec::new(),
        }
    }

    /// Replace the signing keys.
    pub fn with_private_keys(mut self, keys: Vec<PrivateKey>) -> Self {
        self.private_keys = keys;
        self
    }

    /// Add one signing key.
    ///
    /// # Arguments
    /// * `key` - Key appended after any already attached.
    pub fn with_private_key(mut self, key: PrivateKey) -> Self {
        self.private_keys.push(key);
        self
    }

    /// Set the sequence number.
    pub fn with_sequence(mut self, sequence: u32) -> Self {
        self.sequence = sequence;
        self
    }

    /// Set the sighash flags, e.g. `SIGHASH_SINGLE | SIGHASH_FORKID`.
    pub fn with_sighash(mut self, sighash: u32) -> Self {
        self.sighash = sighash;
        self
    }

    /// Override the inferred script type.
    pub fn with_script_type(mut self, script_type: ScriptType) -> Self {
        self.script_type = script_type;
        self
    }

    /// Supply the unlocking script directly, marking the input signed.
    pub fn with_unlocking_script(mut self, script: Script) -> Self {
        self.unlocking_script = Some(script);
        self
    }

    /// Whether an unlocking script is present.
    pub fn is_signed(&self) -> bool {
        self.unlocking_script.is_some()
    }

    /// Deserialize a `TxInput` from a `BsvReader`.
    ///
    /// Only the wire fields are known afterwards: `value` is zero, the
    /// locking script is empty and the script type is `Unknown`. A
    /// zero-length unlocking script reads back as `None`.
    pub fn read_from(reader: &mut BsvReader) -> Result<Self, TransactionError> {
        let txid = reader.read_array::<32>().map_err(|e| {
            TransactionError::DeserializationError(format!("reading source txid: {}", e))
        })?;

        let vout = reader.read_u32_le().map_err(|e| {
            TransactionError::DeserializationError(format!("reading output index: {}", e))
        })?;

        let script_bytes = reader.read_var_bytes().map_err(|e| {
            TransactionError::DeserializationError(format!("reading unlocking script: {}", e))
        })?;

        let sequence = reader.read_u32_le().map_err(|e| {
            TransactionError::DeserializationError(format!("reading sequence number: {}", e))
        })?;

        let unlocking_script = if script_bytes.is_empty() {
            None
        } else {
            Some(Script::from_bytes(script_bytes))
        };

        Ok(TxInput {
            outpoint: Outpoint::new(Hash::new(txid), vout),
            value: 0,
            locking_script: Script::new(),
            unlocking_script,
            sequence,
            sighash: SIGHASH_ALL_FORKID,
            script_type: ScriptType::Unknown,
            private_keys: Vec::new(),
        })
    }

    /// Serialize this input into a `BsvWriter`. An unsigned input writes a
    /// zero-length script.
    pub fn write_to(&self, writer: &mut BsvWriter) {
        self.outpoint.write_to(writer);
        match &self.unlocking_script {
            Some(script) => writer.write_var_bytes(script.to_bytes()),
            None => writer.write_varint(VarInt(0)),
        }
        writer.write_u32_le(self.sequence);
    }

    /// Serialize this input to a byte vector.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut writer = BsvWriter::with_capacity(INPUT_BASE_LEN + 107);
        self.write_to(&mut writer);
        writer.into_bytes()
    }

    /// Exact size if signed, otherwise the pre-signing estimate.
    pub fn estimated_byte_length(&self) -> Result<usize, TransactionError> {
        match &self.unlocking_script {
            Some(script) => Ok(36 + VarInt::from(script.len()).length() + script.len() + 4),
            None => Ok(INPUT_BASE_LEN
                + self
                    .script_type
                    .estimated_unlocking_byte_length(&self.private_keys)?),
        }
    }
}

impl From<Unspent> for TxInput {
    fn from(unspent: Unspent) -> Self {
        TxInput {
            outpoint: Outpoint::new(unspent.txid, unspent.vout),
            value: unspent.value,
            locking_script: unspent.locking_script,
            unlocking_script: None,
            sequence: DEFAULT_SEQUENCE_NUMBER,
            sighash: SIGHASH_ALL_FORKID,
            script_type: unspent.script_type,
            private_keys: unspent.private_keys,
        }
    }
}

impl fmt::Display for TxInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<TxInput outpoint={} value={} locking_script={}>",
            self.outpoint, self.value, self.locking_script
        )
    }
}
