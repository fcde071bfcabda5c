//! Transaction output with satoshi value and locking script.

use std::fmt;

use bsv_primitives::util::{BsvReader, BsvWriter, VarInt};
use bsv_script::{Address, Network, Script};

use crate::template::{op_return, p2pkh, ScriptType};
use crate::TransactionError;

/// Serialized size of a P2PKH output: value(8) + varint(1) + script(25).
pub const P2PKH_OUTPUT_LEN: usize = 34;

/// A single output in a BSV transaction.
///
/// `script_type` is local metadata used when spending the output again or
/// picking a change destination; it is not serialized.
///
/// # Wire format
///
/// | Field            | Size           |
/// |------------------|----------------|
/// | value            | 8 bytes (LE)   |
/// | script length    | VarInt         |
/// | locking_script   | variable       |
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TxOutput {
    /// Satoshis locked by this output.
    pub value: u64,

    /// The locking script that defines spending conditions.
    pub locking_script: Script,

    /// Shape of `locking_script`.
    pub script_type: ScriptType,
}

impl TxOutput {
    /// Output with a raw locking script; the script type is inferred.
    pub fn new(locking_script: Script, value: u64) -> Self {
        TxOutput {
            value,
            script_type: ScriptType::classify(&locking_script),
            locking_script,
        }
    }

    /// Output with a raw locking script and an explicit script type.
    pub fn with_script_type(locking_script: Script, value: u64, script_type: ScriptType) -> Self {
        TxOutput {
            value,
            locking_script,
            script_type,
        }
    }

    /// Pay `value` to a base58check address on `network`.
    ///
    /// # Errors
    /// `UnsupportedOutputType` if the address belongs to another network.
    pub fn p2pkh(address: &str, value: u64, network: Network) -> Result<Self, TransactionError> {
        Ok(TxOutput {
            value,
            locking_script: p2pkh::lock_to_string(address, network)?,
            script_type: ScriptType::P2PKH,
        })
    }

    /// Pay `value` to a decoded address.
    pub fn to_address(address: &Address, value: u64) -> Self {
        TxOutput {
            value,
            locking_script: p2pkh::lock(address),
            script_type: ScriptType::P2PKH,
        }
    }

    /// Zero-value data carrier holding `chunks`.
    pub fn data(chunks: &[&[u8]]) -> Result<Self, TransactionError> {
        Ok(TxOutput {
            value: 0,
            locking_script: op_return::lock(chunks)?,
            script_type: ScriptType::OpReturn,
        })
    }

    /// Deserialize a `TxOutput` from a `BsvReader`, classifying its script.
    pub fn read_from(reader: &mut BsvReader) -> Result<Self, TransactionError> {
        let value = reader.read_u64_le().map_err(|e| {
            TransactionError::DeserializationError(format!("reading value: {}", e))
        })?;

        let script_bytes = reader.read_var_bytes().map_err(|e| {
            TransactionError::DeserializationError(format!("reading locking script: {}", e))
        })?;

        Ok(TxOutput::new(Script::from_bytes(script_bytes), value))
    }

    /// Serialize this `TxOutput` into a `BsvWriter`.
    pub fn write_to(&self, writer: &mut BsvWriter) {
        writer.write_u64_le(self.value);
        writer.write_var_bytes(self.locking_script.to_bytes());
    }

    /// Serialize this output to a byte vector.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut writer = BsvWriter::with_capacity(self.byte_length());
        self.write_to(&mut writer);
        writer.into_bytes()
    }

    /// Serialized length.
    pub fn byte_length(&self) -> usize {
        let script_len = self.locking_script.len();
        8 + VarInt::from(script_len).length() + script_len
    }
}

impl fmt::Display for TxOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<TxOutput value={} locking_script={}>",
            self.value, self.locking_script
        )
    }
}
