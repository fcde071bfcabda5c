use bsv_script::Network;

/// Default fee rate in satoshis per byte.
pub const DEFAULT_FEE_RATE: f64 = 0.5;

/// Default transaction version.
pub const DEFAULT_VERSION: u32 = 1;

/// Construction defaults for a [`Transaction`](crate::Transaction).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TransactionConfig {
    /// Transaction format version.
    pub version: u32,
    /// Lock time.
    pub lock_time: u32,
    /// Satoshis per byte used by fee estimation and change insertion.
    pub fee_rate: f64,
    /// Network that address strings are checked against.
    pub network: Network,
}

impl Default for TransactionConfig {
    fn default() -> Self {
        TransactionConfig {
            version: DEFAULT_VERSION,
            lock_time: 0,
            fee_rate: DEFAULT_FEE_RATE,
            network: Network::Mainnet,
        }
    }
}

impl TransactionConfig {
    /// Defaults with testnet address checks.
    pub fn testnet() -> Self {
        TransactionConfig {
            network: Network::Testnet,
            ..Default::default()
        }
    }

    /// Same defaults with a different fee rate, in satoshis per byte.
    pub fn with_fee_rate(mut self, fee_rate: f64) -> Self {
        self.fee_rate = fee_rate;
        self
    }
}
