//! Primitives for the BSV transaction library.
//!
//! - Hash functions (SHA-256, SHA-256d, RIPEMD-160, Hash160)
//! - Chain hash type with the byte-reversed display convention for txids
//! - Binary codec: varints, little-endian reader and writer
//! - Base58 and Base58Check
//! - secp256k1 keys and the ECDSA signature codecs (DER, recoverable, stringified)

pub mod base58;
pub mod chainhash;
pub mod ec;
pub mod hash;
pub mod util;

mod error;
pub use error::PrimitivesError;
