//! Pay-to-Public-Key-Hash (P2PKH) script template.
//!
//! Locking scripts are `OP_DUP OP_HASH160 <hash> OP_EQUALVERIFY OP_CHECKSIG`;
//! unlocking scripts are `<DER signature + sighash byte> <public key>`.

use bsv_primitives::ec::{PrivateKey, Signature};
use bsv_script::{Address, Network, Script};

use crate::TransactionError;

/// Unlocking script length with a compressed key:
/// push(1) + DER(<=71) + sighash(1) + push(1) + key(33).
pub const COMPRESSED_UNLOCKING_LEN: usize = 107;

/// Unlocking script length with an uncompressed (65-byte) key.
pub const UNCOMPRESSED_UNLOCKING_LEN: usize = 139;

/// Lock to a decoded address.
pub fn lock(address: &Address) -> Script {
    address.locking_script()
}

/// Lock to a base58check address string, which must belong to `network`.
pub fn lock_to_string(address: &str, network: Network) -> Result<Script, TransactionError> {
    let address = Address::from_string(address)?;
    if address.network != network {
        return Err(TransactionError::UnsupportedOutputType(format!(
            "address {} is not a {:?} address",
            address, network
        )));
    }
    Ok(lock(&address))
}

/// Build `<sig> <pubkey>` from the first signature and key.
pub fn unlock(
    signatures: &[Signature],
    keys: &[PrivateKey],
    sighash: u32,
) -> Result<Script, TransactionError> {
    let (signature, key) = match (signatures.first(), keys.first()) {
        (Some(signature), Some(key)) => (signature, key),
        _ => {
            return Err(TransactionError::SigningError(
                "P2PKH input has no private key".to_string(),
            ))
        }
    };

    let der_sig = signature.to_der();
    let mut sig_buf = Vec::with_capacity(der_sig.len() + 1);
    sig_buf.extend_from_slice(&der_sig);
    sig_buf.push(sighash as u8);

    let mut script = Script::new();
    script
        .append_push_data(&sig_buf)?
        .append_push_data(&key.pub_key_bytes())?;
    Ok(script)
}

/// Estimate from the first key's compression; a missing key is assumed compressed.
pub fn estimated_unlocking_byte_length(keys: &[PrivateKey]) -> usize {
    match keys.first() {
        Some(key) if !key.is_compressed() => UNCOMPRESSED_UNLOCKING_LEN,
        _ => COMPRESSED_UNLOCKING_LEN,
    }
}
