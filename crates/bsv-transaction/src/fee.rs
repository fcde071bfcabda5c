//! Size and fee estimation, change insertion and the pre-broadcast fee check.

use bsv_primitives::util::varint_len;
use tracing::{debug, warn};

use crate::output::{TxOutput, P2PKH_OUTPUT_LEN};
use crate::template::ScriptType;
use crate::transaction::Transaction;
use crate::TransactionError;

/// version(4) + lock_time(4).
const ENVELOPE_LEN: usize = 8;

impl Transaction {
    /// Size after signing.
    ///
    /// Signed inputs count at their exact size, unsigned ones at 41 bytes
    /// plus their script type's unlocking estimate. Equals
    /// [`Transaction::byte_length`] once every input is signed.
    pub fn estimated_byte_length(&self) -> Result<usize, TransactionError> {
        let mut length = ENVELOPE_LEN
            + varint_len(self.inputs.len() as u64)
            + varint_len(self.outputs.len() as u64);
        for input in &self.inputs {
            length += input.estimated_byte_length()?;
        }
        for output in &self.outputs {
            length += output.byte_length();
        }
        Ok(length)
    }

    /// `ceil(fee_rate * estimated_byte_length)`.
    pub fn estimated_fee(&self) -> Result<u64, TransactionError> {
        Ok(fee_for(self.fee_rate, self.estimated_byte_length()?))
    }

    /// Return any surplus over the expected fee as one extra P2PKH output.
    ///
    /// The expected fee includes the output being added. The surplus goes to
    /// `change_address` when given, otherwise to the locking script of the
    /// first P2PKH input. Nothing is added when there is no surplus.
    ///
    /// # Errors
    /// `NoChangeDestination` when there is a surplus but no address was
    /// given and no input is P2PKH.
    pub fn add_change(&mut self, change_address: Option<&str>) -> Result<&mut Self, TransactionError> {
        let output_count = self.outputs.len() as u64;
        let size_increased =
            P2PKH_OUTPUT_LEN + varint_len(output_count + 1) - varint_len(output_count);
        let fee_expected = fee_for(self.fee_rate, self.estimated_byte_length()? + size_increased);
        let fee_overpaid = self.fee() as i128 - fee_expected as i128;
        if fee_overpaid <= 0 {
            debug!(fee_expected, fee = self.fee(), "no change to return");
            return Ok(self);
        }
        let change = fee_overpaid as u64;

        let output = match change_address {
            Some(address) => TxOutput::p2pkh(address, change, self.network)?,
            None => {
                let input = self
                    .inputs
                    .iter()
                    .find(|input| input.script_type == ScriptType::P2PKH)
                    .ok_or(TransactionError::NoChangeDestination)?;
                TxOutput::with_script_type(input.locking_script.clone(), change, ScriptType::P2PKH)
            }
        };
        debug!(change, fee_expected, "adding change output");
        self.outputs.push(output);
        Ok(self)
    }

    /// Fail with `InsufficientFunds` if the fee paid is below the estimate.
    pub fn check_fee(&self) -> Result<(), TransactionError> {
        let fee_expected = self.estimated_fee()?;
        if (self.fee() as i128) < fee_expected as i128 {
            let required = self.total_value_out().saturating_add(fee_expected);
            let available = self.total_value_in();
            warn!(required, available, "insufficient fee");
            return Err(TransactionError::InsufficientFunds {
                required,
                available,
            });
        }
        Ok(())
    }
}

fn fee_for(fee_rate: f64, byte_length: usize) -> u64 {
    (fee_rate * byte_length as f64).ceil() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fee_for_rounds_up() {
        assert_eq!(fee_for(0.5, 191), 96);
        assert_eq!(fee_for(0.5, 192), 96);
        assert_eq!(fee_for(1.0, 226), 226);
        assert_eq!(fee_for(0.0, 1000), 0);
    }

    #[test]
    fn test_empty_transaction_envelope() {
        let tx = Transaction::new();
        assert_eq!(tx.estimated_byte_length().unwrap(), 10);
        assert_eq!(tx.estimated_byte_length().unwrap(), tx.byte_length());
        assert_eq!(tx.estimated_fee().unwrap(), 5);
    }
}
