//! secp256k1 keys and ECDSA signatures.
//!
//! Signing is RFC6979-deterministic and always yields canonical low-S
//! signatures. Signatures travel either as strict DER or in the 65-byte
//! recoverable form.

pub mod private_key;
pub mod public_key;
pub mod recoverable;
pub mod signature;

pub use private_key::{PrivateKey, MAINNET_WIF_PREFIX, TESTNET_WIF_PREFIX};
pub use public_key::PublicKey;
pub use recoverable::RecoverableSignature;
pub use signature::Signature;
