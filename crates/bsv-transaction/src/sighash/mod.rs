//! Signature hash computation for transaction signing.
//!
//! BSV signs a BIP-143-style preimage with the FORKID flag set. The three
//! transaction-wide hashes (previous outputs, sequences, outputs) are
//! computed once per batch and shared by every input's preimage.
//!
//! See <https://github.com/bitcoin-sv/bitcoin-sv/blob/master/doc/abc/replay-protected-sighash.md#digest-algorithm>

use bsv_primitives::hash::sha256d;
use bsv_primitives::util::BsvWriter;

use crate::transaction::Transaction;

// -----------------------------------------------------------------------
// Sighash flag constants
// -----------------------------------------------------------------------

/// Sign all inputs and all outputs (the default).
pub const SIGHASH_ALL: u32 = 0x01;

/// Sign all inputs but no outputs, allowing outputs to be modified.
pub const SIGHASH_NONE: u32 = 0x02;

/// Sign all inputs and only the output with the same index as the signed input.
pub const SIGHASH_SINGLE: u32 = 0x03;

/// Combined with another flag: only sign the current input, allowing other
/// inputs to be added later.
pub const SIGHASH_ANYONECANPAY: u32 = 0x80;

/// Replay-protection flag required on all BSV transactions after the UAHF fork.
pub const SIGHASH_FORKID: u32 = 0x40;

/// The standard BSV sighash type: ALL | FORKID.
pub const SIGHASH_ALL_FORKID: u32 = SIGHASH_ALL | SIGHASH_FORKID;

/// Mask applied to extract the base sighash type (ALL, NONE, SINGLE).
pub const SIGHASH_MASK: u32 = 0x1f;

const ZERO_HASH: [u8; 32] = [0u8; 32];

/// Transaction-wide hashes shared by every input's preimage.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SighashCache {
    hash_prevouts: [u8; 32],
    hash_sequence: [u8; 32],
    hash_outputs: [u8; 32],
}

impl SighashCache {
    /// Hash outpoints, sequences and outputs of `tx` once.
    pub fn new(tx: &Transaction) -> Self {
        SighashCache {
            hash_prevouts: prevouts_hash(tx),
            hash_sequence: sequence_hash(tx),
            hash_outputs: outputs_hash(tx),
        }
    }

    /// Preimage for input `index`. The caller guarantees `index` is in range.
    ///
    /// Layout:
    /// 1. nVersion (4 bytes LE)
    /// 2. hashPrevouts (32 bytes), zero with ANYONECANPAY
    /// 3. hashSequence (32 bytes), zero with ANYONECANPAY, SINGLE or NONE
    /// 4. outpoint (32+4 bytes)
    /// 5. scriptCode (varint + locking script of the spent output)
    /// 6. value (8 bytes LE)
    /// 7. nSequence (4 bytes LE)
    /// 8. hashOutputs (32 bytes), see below
    /// 9. nLocktime (4 bytes LE)
    /// 10. sighash type (4 bytes LE)
    ///
    /// hashOutputs covers every output for ALL, only output `index` for
    /// SINGLE when such an output exists, and is zero otherwise.
    pub fn preimage(&self, tx: &Transaction, index: usize) -> Vec<u8> {
        let input = &tx.inputs[index];
        let sighash = input.sighash;
        let base_type = sighash & SIGHASH_MASK;
        let anyone_can_pay = sighash & SIGHASH_ANYONECANPAY != 0;

        let hash_prevouts = if anyone_can_pay {
            ZERO_HASH
        } else {
            self.hash_prevouts
        };

        let hash_sequence =
            if anyone_can_pay || base_type == SIGHASH_SINGLE || base_type == SIGHASH_NONE {
                ZERO_HASH
            } else {
                self.hash_sequence
            };

        let hash_outputs = if base_type != SIGHASH_SINGLE && base_type != SIGHASH_NONE {
            self.hash_outputs
        } else if base_type == SIGHASH_SINGLE && index < tx.outputs.len() {
            sha256d(&tx.outputs[index].to_bytes())
        } else {
            ZERO_HASH
        };

        let script_code = input.locking_script.to_bytes();
        let mut writer = BsvWriter::with_capacity(156 + script_code.len());
        writer.write_u32_le(tx.version);
        writer.write_bytes(&hash_prevouts);
        writer.write_bytes(&hash_sequence);
        input.outpoint.write_to(&mut writer);
        writer.write_var_bytes(script_code);
        writer.write_u64_le(input.value);
        writer.write_u32_le(input.sequence);
        writer.write_bytes(&hash_outputs);
        writer.write_u32_le(tx.lock_time);
        writer.write_u32_le(sighash);
        writer.into_bytes()
    }

    /// Double SHA-256 of [`SighashCache::preimage`].
    pub fn digest(&self, tx: &Transaction, index: usize) -> [u8; 32] {
        sha256d(&self.preimage(tx, index))
    }
}

// -----------------------------------------------------------------------
// Internal helper functions
// -----------------------------------------------------------------------

/// sha256d of every outpoint, txid (32 bytes) + vout (4 bytes LE).
fn prevouts_hash(tx: &Transaction) -> [u8; 32] {
    let mut writer = BsvWriter::with_capacity(tx.inputs.len() * 36);
    for input in &tx.inputs {
        input.outpoint.write_to(&mut writer);
    }
    sha256d(writer.as_bytes())
}

/// sha256d of every input sequence number, 4 bytes LE each.
fn sequence_hash(tx: &Transaction) -> [u8; 32] {
    let mut writer = BsvWriter::with_capacity(tx.inputs.len() * 4);
    for input in &tx.inputs {
        writer.write_u32_le(input.sequence);
    }
    sha256d(writer.as_bytes())
}

/// sha256d of every serialized output.
fn outputs_hash(tx: &Transaction) -> [u8; 32] {
    let mut writer = BsvWriter::new();
    for output in &tx.outputs {
        output.write_to(&mut writer);
    }
    sha256d(writer.as_bytes())
}
