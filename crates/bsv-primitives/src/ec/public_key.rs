//! secp256k1 public key.

use std::fmt;

use k256::ecdsa::VerifyingKey;

use crate::ec::signature::Signature;
use crate::hash::hash160;
use crate::PrimitivesError;

/// Length of a compressed SEC1 public key.
pub const COMPRESSED_LEN: usize = 33;

/// Length of an uncompressed SEC1 public key.
pub const UNCOMPRESSED_LEN: usize = 65;

/// A secp256k1 verifying key.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PublicKey {
    inner: VerifyingKey,
}

impl PublicKey {
    /// Parse SEC1 bytes, compressed (33) or uncompressed (65).
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PrimitivesError> {
        let inner = VerifyingKey::from_sec1_bytes(bytes)
            .map_err(|e| PrimitivesError::InvalidPublicKey(e.to_string()))?;
        Ok(PublicKey { inner })
    }

    /// Parse hex-encoded SEC1 bytes.
    pub fn from_hex(hex_str: &str) -> Result<Self, PrimitivesError> {
        Self::from_bytes(&hex::decode(hex_str)?)
    }

    pub(crate) fn from_verifying_key(inner: VerifyingKey) -> Self {
        PublicKey { inner }
    }

    /// Compressed SEC1 encoding.
    pub fn to_compressed(&self) -> [u8; COMPRESSED_LEN] {
        let mut out = [0u8; COMPRESSED_LEN];
        out.copy_from_slice(self.inner.to_encoded_point(true).as_bytes());
        out
    }

    /// Uncompressed SEC1 encoding.
    pub fn to_uncompressed(&self) -> [u8; UNCOMPRESSED_LEN] {
        let mut out = [0u8; UNCOMPRESSED_LEN];
        out.copy_from_slice(self.inner.to_encoded_point(false).as_bytes());
        out
    }

    /// SEC1 encoding in the requested form.
    pub fn to_bytes(&self, compressed: bool) -> Vec<u8> {
        if compressed {
            self.to_compressed().to_vec()
        } else {
            self.to_uncompressed().to_vec()
        }
    }

    /// `hash160` of the SEC1 encoding in the requested form.
    pub fn hash160(&self, compressed: bool) -> [u8; 20] {
        hash160(&self.to_bytes(compressed))
    }

    /// Verify a signature over a 32-byte digest.
    pub fn verify(&self, digest: &[u8; 32], sig: &Signature) -> bool {
        sig.verify(digest, self)
    }

    pub(crate) fn verifying_key(&self) -> &VerifyingKey {
        &self.inner
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.to_compressed()))
    }
}
