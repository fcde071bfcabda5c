//! Base58 and Base58Check string codecs.
//!
//! Base58Check frames a one-byte version prefix and a payload with a 4-byte
//! checksum: the first four bytes of `sha256d(prefix || payload)`. Addresses
//! and WIF private keys are both carried in this form.

use crate::hash::sha256d;
use crate::PrimitivesError;

/// Length of the Base58Check checksum suffix.
const CHECKSUM_LEN: usize = 4;

/// Encode bytes with the Bitcoin Base58 alphabet.
pub fn encode(data: &[u8]) -> String {
    bs58::encode(data)
        .with_alphabet(bs58::Alphabet::BITCOIN)
        .into_string()
}

/// Decode a Base58 string.
pub fn decode(s: &str) -> Result<Vec<u8>, PrimitivesError> {
    bs58::decode(s)
        .with_alphabet(bs58::Alphabet::BITCOIN)
        .into_vec()
        .map_err(|e| PrimitivesError::InvalidBase58(e.to_string()))
}

/// Encode `version || payload || checksum` as Base58.
pub fn check_encode(version: u8, payload: &[u8]) -> String {
    let mut data = Vec::with_capacity(1 + payload.len() + CHECKSUM_LEN);
    data.push(version);
    data.extend_from_slice(payload);
    let checksum = sha256d(&data);
    data.extend_from_slice(&checksum[..CHECKSUM_LEN]);
    encode(&data)
}

/// Decode a Base58Check string into its version byte and payload.
///
/// # Errors
/// `InvalidBase58` for bad characters or a string too short to hold a
/// version and checksum, `InvalidChecksum` when the checksum does not match.
pub fn check_decode(s: &str) -> Result<(u8, Vec<u8>), PrimitivesError> {
    let decoded = decode(s)?;
    if decoded.len() < 1 + CHECKSUM_LEN {
        return Err(PrimitivesError::InvalidBase58(format!(
            "decoded length {} is too short for version and checksum",
            decoded.len()
        )));
    }
    let (body, checksum) = decoded.split_at(decoded.len() - CHECKSUM_LEN);
    if checksum != &sha256d(body)[..CHECKSUM_LEN] {
        return Err(PrimitivesError::InvalidChecksum);
    }
    Ok((body[0], body[1..].to_vec()))
}
