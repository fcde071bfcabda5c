/// Error types for script operations.
///
/// Covers chunk parsing, pushdata encoding, and P2PKH address handling.
#[derive(Debug, thiserror::Error)]
pub enum ScriptError {
    /// Invalid opcode data encountered during ASM parsing.
    #[error("invalid opcode data")]
    InvalidOpcodeData,

    /// Attempted to use append_opcodes for a push data opcode.
    #[error("use append_push_data for push data funcs: {0}")]
    InvalidOpcodeType(String),

    /// A push could not be encoded.
    #[error("encoding error: {0}")]
    EncodingError(String),

    /// Invalid address string.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// Address version not supported (not P2PKH mainnet/testnet).
    #[error("address not supported {0}")]
    UnsupportedAddress(String),

    /// Base58Check checksum does not match.
    #[error("checksum failed")]
    EncodingChecksumFailed,

    /// Hex decoding error.
    #[error("hex decode error: {0}")]
    HexDecode(#[from] hex::FromHexError),

    /// Script is not a P2PKH script.
    #[error("not a P2PKH")]
    NotP2PKH,

    /// Not enough data in script to complete a push operation.
    #[error("not enough data")]
    DataTooSmall,

    /// Error from primitives crate.
    #[error("primitives error: {0}")]
    Primitives(#[from] bsv_primitives::PrimitivesError),
}
