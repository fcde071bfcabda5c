//! Recoverable signatures and their stringified wire form.
//!
//! Binary form is 65 bytes: `r (32) || s (32) || recovery_id (1)`.
//! Stringified form is `base64(prefix || r || s)` where
//! `prefix = 27 + recovery_id + (4 if the signer's key is compressed)`.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use k256::ecdsa::{RecoveryId, VerifyingKey};

use crate::ec::public_key::PublicKey;
use crate::ec::signature::Signature;
use crate::PrimitivesError;

/// Length of both the binary and the decoded stringified form.
pub const RECOVERABLE_SIGNATURE_LEN: usize = 65;

const PREFIX_BASE: u8 = 27;
const COMPRESSED_OFFSET: u8 = 4;
const MAX_RECOVERY_ID: u8 = 3;

/// A signature plus the id needed to recover the signing public key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecoverableSignature {
    signature: Signature,
    recovery_id: u8,
}

impl RecoverableSignature {
    /// Pair a signature with a recovery id in `0..=3`.
    pub fn new(signature: Signature, recovery_id: u8) -> Result<Self, PrimitivesError> {
        if recovery_id > MAX_RECOVERY_ID {
            return Err(PrimitivesError::InvalidRecoveryId(recovery_id));
        }
        Ok(RecoverableSignature {
            signature,
            recovery_id,
        })
    }

    /// The `(r, s)` pair.
    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// The recovery id, always in `0..=3`.
    pub fn recovery_id(&self) -> u8 {
        self.recovery_id
    }

    /// Encode as `r || s || recovery_id`.
    pub fn to_bytes(&self) -> [u8; RECOVERABLE_SIGNATURE_LEN] {
        let mut out = [0u8; RECOVERABLE_SIGNATURE_LEN];
        out[..32].copy_from_slice(self.signature.r());
        out[32..64].copy_from_slice(self.signature.s());
        out[64] = self.recovery_id;
        out
    }

    /// Decode `r || s || recovery_id`.
    ///
    /// # Errors
    /// `InvalidSignatureLength` unless exactly 65 bytes, `InvalidRecoveryId`
    /// when the last byte is above 3.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PrimitivesError> {
        let (r, s) = split_rs(bytes)?;
        Self::new(Signature::new(r, s), bytes[64])
    }

    /// Encode as base64 of `prefix || r || s`.
    pub fn to_stringified(&self, compressed: bool) -> String {
        let mut raw = [0u8; RECOVERABLE_SIGNATURE_LEN];
        raw[0] = PREFIX_BASE
            + self.recovery_id
            + if compressed { COMPRESSED_OFFSET } else { 0 };
        raw[1..33].copy_from_slice(self.signature.r());
        raw[33..].copy_from_slice(self.signature.s());
        STANDARD.encode(raw)
    }

    /// Decode the stringified form, returning the signature and whether the
    /// signer's public key is compressed.
    ///
    /// # Errors
    /// `InvalidBase64`, `InvalidSignatureLength` unless 65 decoded bytes,
    /// `InvalidPrefix` when the prefix is outside `27..=34`.
    pub fn from_stringified(s: &str) -> Result<(Self, bool), PrimitivesError> {
        let raw = STANDARD.decode(s)?;
        if raw.len() != RECOVERABLE_SIGNATURE_LEN {
            return Err(PrimitivesError::InvalidSignatureLength {
                expected: RECOVERABLE_SIGNATURE_LEN,
                got: raw.len(),
            });
        }
        let mut prefix = raw[0];
        if !(PREFIX_BASE..=PREFIX_BASE + COMPRESSED_OFFSET + MAX_RECOVERY_ID).contains(&prefix) {
            return Err(PrimitivesError::InvalidPrefix(prefix));
        }
        let compressed = prefix >= PREFIX_BASE + COMPRESSED_OFFSET;
        if compressed {
            prefix -= COMPRESSED_OFFSET;
        }
        let mut rs = raw[1..].to_vec();
        rs.push(prefix - PREFIX_BASE);
        Ok((Self::from_bytes(&rs)?, compressed))
    }

    /// Recover the public key that produced this signature over `digest`.
    pub fn recover_public_key(&self, digest: &[u8; 32]) -> Result<PublicKey, PrimitivesError> {
        let recovery_id = RecoveryId::from_byte(self.recovery_id)
            .ok_or(PrimitivesError::InvalidRecoveryId(self.recovery_id))?;
        let sig = self.signature.to_k256()?;
        // Low-S normalization mirrors R's y-coordinate parity.
        let recovery_id = if self.signature.is_low_s() {
            recovery_id
        } else {
            RecoveryId::new(!recovery_id.is_y_odd(), recovery_id.is_x_reduced())
        };
        let key = VerifyingKey::recover_from_prehash(digest, &sig, recovery_id)
            .map_err(|e| PrimitivesError::InvalidSignature(e.to_string()))?;
        Ok(PublicKey::from_verifying_key(key))
    }
}

fn split_rs(bytes: &[u8]) -> Result<([u8; 32], [u8; 32]), PrimitivesError> {
    if bytes.len() != RECOVERABLE_SIGNATURE_LEN {
        return Err(PrimitivesError::InvalidSignatureLength {
            expected: RECOVERABLE_SIGNATURE_LEN,
            got: bytes.len(),
        });
    }
    let mut r = [0u8; 32];
    let mut s = [0u8; 32];
    r.copy_from_slice(&bytes[..32]);
    s.copy_from_slice(&bytes[32..64]);
    Ok((r, s))
}
