//! The `Script` byte newtype.
//!
//! Locking and unlocking scripts are opaque byte strings to the transaction
//! format; this type adds hex/ASM conversion, the shape checks used to pick a
//! script type, and push/opcode builders.

use std::fmt;

use crate::chunk::{decode_script, encode_pushdata, ScriptChunk};
use crate::opcodes::*;
use crate::ScriptError;

/// Length of a standard P2PKH locking script.
pub const P2PKH_SCRIPT_LEN: usize = 25;

/// A script as raw bytes.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct Script(Vec<u8>);

impl Script {
    /// An empty script.
    pub fn new() -> Self {
        Script(Vec::new())
    }

    /// Parse lowercase or uppercase hex.
    pub fn from_hex(hex_str: &str) -> Result<Self, ScriptError> {
        Ok(Script(hex::decode(hex_str)?))
    }

    /// Copy raw bytes into a script.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Script(bytes.to_vec())
    }

    /// Parse space-separated ASM. Known opcode names are emitted as opcodes,
    /// every other token is hex data pushed with the shortest prefix.
    pub fn from_asm(asm: &str) -> Result<Self, ScriptError> {
        let mut script = Script::new();
        for token in asm.split_whitespace() {
            match string_to_opcode(token) {
                Some(op) => script.0.push(op),
                None => {
                    let data = hex::decode(token).map_err(|_| ScriptError::InvalidOpcodeData)?;
                    script.append_push_data(&data)?;
                }
            }
        }
        Ok(script)
    }

    /// The P2PKH locking script `OP_DUP OP_HASH160 <pkh> OP_EQUALVERIFY OP_CHECKSIG`.
    pub fn p2pkh(public_key_hash: &[u8; 20]) -> Self {
        let mut bytes = Vec::with_capacity(P2PKH_SCRIPT_LEN);
        bytes.extend_from_slice(&[OP_DUP, OP_HASH160, OP_DATA_20]);
        bytes.extend_from_slice(public_key_hash);
        bytes.extend_from_slice(&[OP_EQUALVERIFY, OP_CHECKSIG]);
        Script(bytes)
    }

    /// Lowercase hex.
    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }

    /// Space-separated ASM, or an empty string if the script does not parse.
    pub fn to_asm(&self) -> String {
        match self.chunks() {
            Ok(chunks) => chunks
                .iter()
                .map(ScriptChunk::to_asm_string)
                .collect::<Vec<_>>()
                .join(" "),
            Err(_) => String::new(),
        }
    }

    /// Borrow the raw bytes.
    pub fn to_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Consume into the raw bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    /// Length in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the script has no bytes.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    // -----------------------------------------------------------------------
    // Shape checks
    // -----------------------------------------------------------------------

    /// `OP_DUP OP_HASH160 <20 bytes> OP_EQUALVERIFY OP_CHECKSIG`.
    pub fn is_p2pkh(&self) -> bool {
        let b = &self.0;
        b.len() == P2PKH_SCRIPT_LEN
            && b[0] == OP_DUP
            && b[1] == OP_HASH160
            && b[2] == OP_DATA_20
            && b[23] == OP_EQUALVERIFY
            && b[24] == OP_CHECKSIG
    }

    /// Starts with `OP_RETURN` or `OP_FALSE OP_RETURN`.
    pub fn is_data(&self) -> bool {
        match self.0.as_slice() {
            [OP_RETURN, ..] => true,
            [OP_FALSE, OP_RETURN, ..] => true,
            _ => false,
        }
    }

    /// The 20-byte hash committed to by a P2PKH script.
    pub fn public_key_hash(&self) -> Result<[u8; 20], ScriptError> {
        if !self.is_p2pkh() {
            return Err(ScriptError::NotP2PKH);
        }
        let mut pkh = [0u8; 20];
        pkh.copy_from_slice(&self.0[3..23]);
        Ok(pkh)
    }

    /// Decode into chunks.
    pub fn chunks(&self) -> Result<Vec<ScriptChunk>, ScriptError> {
        decode_script(&self.0)
    }

    // -----------------------------------------------------------------------
    // Builders
    // -----------------------------------------------------------------------

    /// Append a length-prefixed push of `data`.
    pub fn append_push_data(&mut self, data: &[u8]) -> Result<&mut Self, ScriptError> {
        let encoded = encode_pushdata(data, false).or_else(|e| {
            if data.is_empty() {
                Ok(vec![OP_0])
            } else {
                Err(e)
            }
        })?;
        self.0.extend_from_slice(&encoded);
        Ok(self)
    }

    /// Append a minimal push of `data` (small numbers become `OP_N`).
    pub fn append_minimal_push(&mut self, data: &[u8]) -> Result<&mut Self, ScriptError> {
        self.0.extend_from_slice(&encode_pushdata(data, true)?);
        Ok(self)
    }

    /// Append non-push opcodes. Push opcodes are rejected; use the push builders.
    pub fn append_opcodes(&mut self, opcodes: &[u8]) -> Result<&mut Self, ScriptError> {
        if let Some(&op) = opcodes
            .iter()
            .find(|&&op| (OP_DATA_1..=OP_PUSHDATA4).contains(&op))
        {
            return Err(ScriptError::InvalidOpcodeType(opcode_to_string(op)));
        }
        self.0.extend_from_slice(opcodes);
        Ok(self)
    }
}

impl From<Vec<u8>> for Script {
    fn from(bytes: Vec<u8>) -> Self {
        Script(bytes)
    }
}

impl fmt::Display for Script {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Script {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Script({})", self.to_hex())
    }
}

impl serde::Serialize for Script {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> serde::Deserialize<'de> for Script {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Script::from_hex(&s).map_err(serde::de::Error::custom)
    }
}
