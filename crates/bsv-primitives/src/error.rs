/// Error type for hashing, binary codec, key, and signature operations.
#[derive(Debug, thiserror::Error)]
pub enum PrimitivesError {
    #[error("invalid private key: {0}")]
    InvalidPrivateKey(String),

    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),

    #[error("invalid signature: {0}")]
    InvalidSignature(String),

    /// DER framing did not match: outer tag, declared length, or an INTEGER tag.
    #[error("invalid signature encoding: {0}")]
    InvalidSignatureEncoding(String),

    #[error("invalid signature length: expected {expected}, got {got}")]
    InvalidSignatureLength { expected: usize, got: usize },

    #[error("invalid recovery id {0}, expected 0..=3")]
    InvalidRecoveryId(u8),

    #[error("invalid signature prefix {0}, expected 27..=34")]
    InvalidPrefix(u8),

    #[error("invalid WIF format: {0}")]
    InvalidWif(String),

    #[error("invalid checksum")]
    InvalidChecksum,

    #[error("invalid hex: {0}")]
    InvalidHex(String),

    #[error("invalid base64: {0}")]
    InvalidBase64(String),

    #[error("invalid hash: {0}")]
    InvalidHash(String),

    #[error("invalid base58: {0}")]
    InvalidBase58(String),

    #[error("unexpected end of data")]
    UnexpectedEof,
}

impl From<hex::FromHexError> for PrimitivesError {
    fn from(e: hex::FromHexError) -> Self {
        PrimitivesError::InvalidHex(e.to_string())
    }
}

impl From<base64::DecodeError> for PrimitivesError {
    fn from(e: base64::DecodeError) -> Self {
        PrimitivesError::InvalidBase64(e.to_string())
    }
}
