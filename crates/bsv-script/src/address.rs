/// P2PKH addresses.
///
/// An address is the Base58Check encoding of a version byte (0x00 mainnet,
/// 0x6f testnet) followed by a 20-byte public key hash.

use std::fmt;
use std::str::FromStr;

use bsv_primitives::base58;
use bsv_primitives::ec::PublicKey;
use bsv_primitives::PrimitivesError;

use crate::{Script, ScriptError};

/// Mainnet P2PKH address version byte.
const MAINNET_P2PKH: u8 = 0x00;
/// Testnet P2PKH address version byte.
const TESTNET_P2PKH: u8 = 0x6f;

/// Network an address belongs to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Network {
    /// Address prefix 0x00, starts with '1'.
    #[default]
    Mainnet,
    /// Address prefix 0x6f, starts with 'm' or 'n'.
    Testnet,
}

impl Network {
    fn address_version(self) -> u8 {
        match self {
            Network::Mainnet => MAINNET_P2PKH,
            Network::Testnet => TESTNET_P2PKH,
        }
    }
}

/// A P2PKH address.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Address {
    /// The Base58Check address string.
    pub address_string: String,
    /// The 20-byte hash160 of the public key.
    pub public_key_hash: [u8; 20],
    /// The network this address belongs to.
    pub network: Network,
}

impl Address {
    /// Parse a Base58Check address string, detecting the network from the
    /// version byte.
    pub fn from_string(addr: &str) -> Result<Self, ScriptError> {
        let (version, payload) = base58::check_decode(addr).map_err(|e| match e {
            PrimitivesError::InvalidChecksum => ScriptError::EncodingChecksumFailed,
            other => ScriptError::InvalidAddress(format!("'{}': {}", addr, other)),
        })?;

        let network = match version {
            MAINNET_P2PKH => Network::Mainnet,
            TESTNET_P2PKH => Network::Testnet,
            _ => return Err(ScriptError::UnsupportedAddress(addr.to_string())),
        };

        let public_key_hash: [u8; 20] = payload.as_slice().try_into().map_err(|_| {
            ScriptError::InvalidAddress(format!("'{}': payload is {} bytes", addr, payload.len()))
        })?;

        Ok(Address {
            address_string: addr.to_string(),
            public_key_hash,
            network,
        })
    }

    /// Address for a 20-byte public key hash.
    pub fn from_public_key_hash(hash: &[u8; 20], network: Network) -> Self {
        Address {
            address_string: base58::check_encode(network.address_version(), hash),
            public_key_hash: *hash,
            network,
        }
    }

    /// Address for a public key in the given SEC1 form.
    pub fn from_public_key(public_key: &PublicKey, compressed: bool, network: Network) -> Self {
        Self::from_public_key_hash(&public_key.hash160(compressed), network)
    }

    /// The P2PKH locking script paying to this address.
    pub fn locking_script(&self) -> Script {
        Script::p2pkh(&self.public_key_hash)
    }
}

impl FromStr for Address {
    type Err = ScriptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Address::from_string(s)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.address_string)
    }
}
