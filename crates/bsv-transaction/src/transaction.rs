//! Core transaction type for the BSV blockchain.
//!
//! A transaction is built incrementally, its per-input digests are computed
//! from its current state, signing fills in unlocking scripts in place, and
//! serialization can be repeated at any point without side effects.

use std::fmt;

use bsv_primitives::chainhash::Hash;
use bsv_primitives::util::{BsvReader, BsvWriter, VarInt};
use bsv_script::Network;
use tracing::debug;

use crate::broadcaster::{AsyncBroadcaster, BroadcastSuccess, Broadcaster};
use crate::config::TransactionConfig;
use crate::input::TxInput;
use crate::output::TxOutput;
use crate::sighash::SighashCache;
use crate::template::ScriptType;
use crate::unspent::Unspent;
use crate::TransactionError;

/// Smallest serialized input, used to bound preallocation when parsing.
const MIN_INPUT_LEN: usize = 41;
/// Smallest serialized output.
const MIN_OUTPUT_LEN: usize = 9;

/// A BSV transaction consisting of a version, a set of inputs, a set of
/// outputs, and a lock time.
///
/// # Wire format
///
/// | Field        | Size                      |
/// |--------------|---------------------------|
/// | version      | 4 bytes (LE)              |
/// | input count  | VarInt                    |
/// | inputs       | variable (per input)      |
/// | output count | VarInt                    |
/// | outputs      | variable (per output)     |
/// | lock_time    | 4 bytes (LE)              |
///
/// `fee_rate` and `network` are local settings and are not serialized.
#[derive(Clone, Debug, PartialEq)]
pub struct Transaction {
    /// Transaction format version.
    pub version: u32,

    /// Ordered list of transaction inputs.
    pub inputs: Vec<TxInput>,

    /// Ordered list of transaction outputs.
    pub outputs: Vec<TxOutput>,

    /// Lock time. If non-zero, the transaction is not valid until the
    /// specified block height or Unix timestamp.
    pub lock_time: u32,

    /// Satoshis per byte.
    pub fee_rate: f64,

    /// Network that change and output addresses must belong to.
    pub network: Network,
}

impl Transaction {
    /// An empty transaction with the default configuration.
    pub fn new() -> Self {
        Self::with_config(TransactionConfig::default())
    }

    /// An empty transaction with the given configuration.
    pub fn with_config(config: TransactionConfig) -> Self {
        Transaction {
            version: config.version,
            inputs: Vec::new(),
            outputs: Vec::new(),
            lock_time: config.lock_time,
            fee_rate: config.fee_rate,
            network: config.network,
        }
    }

    // -----------------------------------------------------------------
    // Deserialization
    // -----------------------------------------------------------------

    /// Parse a transaction from a hex-encoded string.
    pub fn from_hex(hex_str: &str) -> Result<Self, TransactionError> {
        let bytes = hex::decode(hex_str).map_err(|e| {
            TransactionError::DeserializationError(format!("invalid hex: {}", e))
        })?;
        Self::from_bytes(&bytes)
    }

    /// Parse a transaction from raw bytes.
    ///
    /// The slice must hold exactly one transaction with no trailing data.
    /// Inputs come back without the spent outputs' values and scripts.
    ///
    /// A zero-length unlocking script reads back as unsigned. An input that
    /// really spends with an empty script (an `OP_TRUE` output, say) must be
    /// given `Some(Script::new())` again before size estimation or the fee
    /// check, which otherwise fail with `UnsupportedOutputType`.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, TransactionError> {
        let mut reader = BsvReader::new(bytes);
        let tx = Self::read_from(&mut reader)?;
        if reader.remaining() != 0 {
            return Err(TransactionError::DeserializationError(format!(
                "trailing {} bytes after transaction",
                reader.remaining()
            )));
        }
        Ok(tx)
    }

    /// Deserialize a transaction from a `BsvReader`.
    pub fn read_from(reader: &mut BsvReader) -> Result<Self, TransactionError> {
        let version = reader.read_u32_le().map_err(|e| {
            TransactionError::DeserializationError(format!("reading version: {}", e))
        })?;

        let input_count = reader.read_varint().map_err(|e| {
            TransactionError::DeserializationError(format!("reading input count: {}", e))
        })?;
        let mut inputs = Vec::with_capacity(bounded_capacity(
            input_count.value(),
            reader.remaining() / MIN_INPUT_LEN,
        ));
        for _ in 0..input_count.value() {
            inputs.push(TxInput::read_from(reader)?);
        }

        let output_count = reader.read_varint().map_err(|e| {
            TransactionError::DeserializationError(format!("reading output count: {}", e))
        })?;
        let mut outputs = Vec::with_capacity(bounded_capacity(
            output_count.value(),
            reader.remaining() / MIN_OUTPUT_LEN,
        ));
        for _ in 0..output_count.value() {
            outputs.push(TxOutput::read_from(reader)?);
        }

        let lock_time = reader.read_u32_le().map_err(|e| {
            TransactionError::DeserializationError(format!("reading lock time: {}", e))
        })?;

        let config = TransactionConfig::default();
        Ok(Transaction {
            version,
            inputs,
            outputs,
            lock_time,
            fee_rate: config.fee_rate,
            network: config.network,
        })
    }

    // -----------------------------------------------------------------
    // Serialization
    // -----------------------------------------------------------------

    /// Serialize this transaction to raw bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut writer = BsvWriter::with_capacity(256);
        writer.write_u32_le(self.version);

        writer.write_varint(VarInt::from(self.inputs.len()));
        for input in &self.inputs {
            input.write_to(&mut writer);
        }

        writer.write_varint(VarInt::from(self.outputs.len()));
        for output in &self.outputs {
            output.write_to(&mut writer);
        }

        writer.write_u32_le(self.lock_time);
        writer.into_bytes()
    }

    /// Serialize this transaction to a lowercase hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    /// Actual serialized size under the current state.
    pub fn byte_length(&self) -> usize {
        self.to_bytes().len()
    }

    // -----------------------------------------------------------------
    // Transaction ID
    // -----------------------------------------------------------------

    /// Double SHA-256 of the serialized bytes. `Display` on the returned
    /// hash gives the conventional byte-reversed hex.
    pub fn tx_id(&self) -> Hash {
        Hash::sha256d(&self.to_bytes())
    }

    /// The txid as display-order hex.
    pub fn tx_id_hex(&self) -> String {
        self.tx_id().to_string()
    }

    // -----------------------------------------------------------------
    // Inputs and outputs
    // -----------------------------------------------------------------

    /// Append an input, or an [`Unspent`] converted into one.
    pub fn add_input(&mut self, input: impl Into<TxInput>) -> &mut Self {
        self.inputs.push(input.into());
        self
    }

    /// Append several inputs, in order.
    pub fn add_inputs<I>(&mut self, inputs: I) -> &mut Self
    where
        I: IntoIterator,
        I::Item: Into<TxInput>,
    {
        self.inputs.extend(inputs.into_iter().map(Into::into));
        self
    }

    /// Append an output.
    ///
    /// # Arguments
    /// * `output` - The output to add.
    pub fn add_output(&mut self, output: TxOutput) -> &mut Self {
        self.outputs.push(output);
        self
    }

    /// Append several outputs, in order.
    pub fn add_outputs(&mut self, outputs: impl IntoIterator<Item = TxOutput>) -> &mut Self {
        self.outputs.extend(outputs);
        self
    }

    /// Number of inputs.
    pub fn input_count(&self) -> usize {
        self.inputs.len()
    }

    /// Number of outputs.
    pub fn output_count(&self) -> usize {
        self.outputs.len()
    }

    /// Sum of the values of the outputs being spent.
    pub fn total_value_in(&self) -> u64 {
        self.inputs
            .iter()
            .fold(0u64, |acc, input| acc.saturating_add(input.value))
    }

    /// Sum of the output values.
    pub fn total_value_out(&self) -> u64 {
        self.outputs
            .iter()
            .fold(0u64, |acc, output| acc.saturating_add(output.value))
    }

    /// Inputs minus outputs. Negative while inputs are still being added.
    pub fn fee(&self) -> i64 {
        let fee = self.total_value_in() as i128 - self.total_value_out() as i128;
        fee.clamp(i64::MIN as i128, i64::MAX as i128) as i64
    }

    // -----------------------------------------------------------------
    // Signature hash
    // -----------------------------------------------------------------

    /// Sighash preimage of every input, sharing one batch of hashes.
    pub fn preimages(&self) -> Vec<Vec<u8>> {
        let cache = SighashCache::new(self);
        (0..self.inputs.len())
            .map(|i| cache.preimage(self, i))
            .collect()
    }

    /// Sighash digest of every input, sharing one batch of hashes.
    pub fn digests(&self) -> Vec<[u8; 32]> {
        let cache = SighashCache::new(self);
        (0..self.inputs.len())
            .map(|i| cache.digest(self, i))
            .collect()
    }

    /// Sighash digest of input `index`.
    pub fn digest(&self, index: usize) -> Result<[u8; 32], TransactionError> {
        if index >= self.inputs.len() {
            return Err(TransactionError::InvalidTransaction(format!(
                "input index {} out of range (tx has {} inputs)",
                index,
                self.inputs.len()
            )));
        }
        Ok(SighashCache::new(self).digest(self, index))
    }

    // -----------------------------------------------------------------
    // Signing
    // -----------------------------------------------------------------

    /// Sign inputs with their attached keys.
    ///
    /// Only inputs without an unlocking script are signed unless
    /// `force_resign` is set. All digests are taken from the state before
    /// this call; unlocking scripts are not part of any digest.
    pub fn sign(&mut self, force_resign: bool) -> Result<&mut Self, TransactionError> {
        let digests = self.digests();
        for (index, (input, digest)) in self.inputs.iter_mut().zip(digests.iter()).enumerate() {
            if input.is_signed() && !force_resign {
                continue;
            }
            let signatures = input
                .private_keys
                .iter()
                .map(|key| key.sign(digest))
                .collect::<Result<Vec<_>, _>>()?;
            let unlocking =
                input
                    .script_type
                    .unlocking(&signatures, &input.private_keys, input.sighash)?;
            debug!(
                input = index,
                outpoint = %input.outpoint,
                script_len = unlocking.len(),
                "signed input"
            );
            input.unlocking_script = Some(unlocking);
        }
        Ok(self)
    }

    // -----------------------------------------------------------------
    // Broadcast
    // -----------------------------------------------------------------

    /// Hand the serialized transaction to a blocking broadcaster, after the
    /// fee check when `check_fee` is set.
    pub fn broadcast<B: Broadcaster>(
        &self,
        broadcaster: &B,
        check_fee: bool,
    ) -> Result<BroadcastSuccess, TransactionError> {
        if check_fee {
            self.check_fee()?;
        }
        Ok(broadcaster.broadcast(&self.to_bytes())?)
    }

    /// Non-blocking [`Transaction::broadcast`].
    pub async fn broadcast_async<B: AsyncBroadcaster>(
        &self,
        broadcaster: &B,
        check_fee: bool,
    ) -> Result<BroadcastSuccess, TransactionError> {
        if check_fee {
            self.check_fee()?;
        }
        let raw_tx = self.to_bytes();
        Ok(broadcaster.broadcast_async(&raw_tx).await?)
    }

    // -----------------------------------------------------------------
    // Unspents
    // -----------------------------------------------------------------

    /// Output `vout` as a spendable record, or `None` for a data carrier.
    pub fn to_unspent(&self, vout: u32) -> Result<Option<Unspent>, TransactionError> {
        let output = self.outputs.get(vout as usize).ok_or_else(|| {
            TransactionError::InvalidTransaction(format!(
                "vout {} out of range (tx has {} outputs)",
                vout,
                self.outputs.len()
            ))
        })?;
        if output.script_type == ScriptType::OpReturn {
            return Ok(None);
        }
        Ok(Some(Unspent {
            txid: self.tx_id(),
            vout,
            value: output.value,
            locking_script: output.locking_script.clone(),
            script_type: output.script_type,
            private_keys: Vec::new(),
        }))
    }

    /// Records for the given outputs, or for all outputs when `vouts` is
    /// `None` or empty. Data carriers are skipped.
    pub fn to_unspents(&self, vouts: Option<&[u32]>) -> Result<Vec<Unspent>, TransactionError> {
        let all: Vec<u32>;
        let vouts = match vouts {
            Some(vouts) if !vouts.is_empty() => vouts,
            _ => {
                all = (0..self.outputs.len() as u32).collect();
                &all
            }
        };
        let mut unspents = Vec::with_capacity(vouts.len());
        for &vout in vouts {
            if let Some(unspent) = self.to_unspent(vout)? {
                unspents.push(unspent);
            }
        }
        Ok(unspents)
    }
}

/// Preallocation never exceeds what the remaining bytes could hold.
fn bounded_capacity(count: u64, max_fit: usize) -> usize {
    usize::try_from(count).map_or(max_fit, |count| count.min(max_fit))
}

impl Default for Transaction {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Transaction {
    /// Display the transaction as its hex-encoded serialization.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}
