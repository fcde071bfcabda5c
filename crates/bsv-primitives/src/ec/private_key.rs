//! secp256k1 private key.
//!
//! Wraps a k256 `SigningKey` together with the public-key compression flag
//! that WIF carries, since that flag decides which public key bytes a P2PKH
//! script commits to.

use k256::ecdsa::SigningKey;
use rand::rngs::OsRng;
use zeroize::Zeroize;

use crate::base58;
use crate::ec::public_key::PublicKey;
use crate::ec::recoverable::RecoverableSignature;
use crate::ec::signature::Signature;
use crate::PrimitivesError;

/// Length of a serialized private key scalar.
const PRIVATE_KEY_BYTES_LEN: usize = 32;

/// WIF version byte for mainnet keys.
pub const MAINNET_WIF_PREFIX: u8 = 0x80;

/// WIF version byte for testnet keys.
pub const TESTNET_WIF_PREFIX: u8 = 0xef;

/// Trailing WIF byte marking a compressed public key.
const COMPRESS_MAGIC: u8 = 0x01;

/// A secp256k1 signing key.
#[derive(Clone, Debug)]
pub struct PrivateKey {
    inner: SigningKey,
    compressed: bool,
}

impl PrivateKey {
    /// Generate a random key. The public key is compressed.
    pub fn new() -> Self {
        PrivateKey {
            inner: SigningKey::random(&mut OsRng),
            compressed: true,
        }
    }

    /// Create a key from a 32-byte big-endian scalar.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PrimitivesError> {
        if bytes.len() != PRIVATE_KEY_BYTES_LEN {
            return Err(PrimitivesError::InvalidPrivateKey(format!(
                "expected {} bytes, got {}",
                PRIVATE_KEY_BYTES_LEN,
                bytes.len()
            )));
        }
        let inner = SigningKey::from_slice(bytes)
            .map_err(|e| PrimitivesError::InvalidPrivateKey(e.to_string()))?;
        Ok(PrivateKey {
            inner,
            compressed: true,
        })
    }

    /// Create a key from 64 hex characters.
    pub fn from_hex(hex_str: &str) -> Result<Self, PrimitivesError> {
        let mut bytes = hex::decode(hex_str)?;
        let key = Self::from_bytes(&bytes);
        bytes.zeroize();
        key
    }

    /// Decode a WIF string.
    ///
    /// A 33-byte payload ending in `0x01` yields a compressed key; a 32-byte
    /// payload yields an uncompressed one. The version byte is not checked
    /// against a network.
    pub fn from_wif(wif: &str) -> Result<Self, PrimitivesError> {
        let (_version, mut payload) = base58::check_decode(wif)?;
        let compressed = match payload.len() {
            33 if payload[32] == COMPRESS_MAGIC => true,
            33 => {
                payload.zeroize();
                return Err(PrimitivesError::InvalidWif(
                    "invalid compression flag".to_string(),
                ));
            }
            32 => false,
            n => {
                payload.zeroize();
                return Err(PrimitivesError::InvalidWif(format!(
                    "invalid payload length {}",
                    n
                )));
            }
        };
        let key = Self::from_bytes(&payload[..PRIVATE_KEY_BYTES_LEN]);
        payload.zeroize();
        Ok(key?.with_compressed(compressed))
    }

    /// Encode as WIF with the given version byte (`0x80` mainnet, `0xef` testnet).
    pub fn to_wif(&self, prefix: u8) -> String {
        let mut payload = self.to_bytes().to_vec();
        if self.compressed {
            payload.push(COMPRESS_MAGIC);
        }
        let wif = base58::check_encode(prefix, &payload);
        payload.zeroize();
        wif
    }

    /// Override the public-key compression flag.
    pub fn with_compressed(mut self, compressed: bool) -> Self {
        self.compressed = compressed;
        self
    }

    /// Whether the public key is serialized compressed.
    pub fn is_compressed(&self) -> bool {
        self.compressed
    }

    /// The 32-byte scalar.
    pub fn to_bytes(&self) -> [u8; 32] {
        self.inner.to_bytes().into()
    }

    /// The matching public key.
    pub fn pub_key(&self) -> PublicKey {
        PublicKey::from_verifying_key(*self.inner.verifying_key())
    }

    /// The public key serialized per this key's compression flag.
    pub fn pub_key_bytes(&self) -> Vec<u8> {
        self.pub_key().to_bytes(self.compressed)
    }

    /// Sign a 32-byte digest with an RFC6979 nonce. The result is low-S.
    pub fn sign(&self, digest: &[u8; 32]) -> Result<Signature, PrimitivesError> {
        Ok(self.sign_recoverable(digest)?.signature().clone())
    }

    /// Sign a 32-byte digest, keeping the public key recovery id.
    pub fn sign_recoverable(&self, digest: &[u8; 32]) -> Result<RecoverableSignature, PrimitivesError> {
        let (sig, recovery_id) = self
            .inner
            .sign_prehash_recoverable(digest)
            .map_err(|e| PrimitivesError::InvalidSignature(e.to_string()))?;
        let mut sig = Signature::from_k256(&sig);
        let mut recovery_id = recovery_id.to_byte();
        if !sig.is_low_s() {
            sig = sig.to_low_s();
            recovery_id ^= 1;
        }
        RecoverableSignature::new(sig, recovery_id)
    }
}

impl Default for PrivateKey {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for PrivateKey {
    fn eq(&self, other: &Self) -> bool {
        self.inner == other.inner && self.compressed == other.compressed
    }
}

impl Eq for PrivateKey {}
