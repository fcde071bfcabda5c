//! ARC data types: configuration, status codes, and API response structures.

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default time allowed for a broadcast request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default time allowed for a status query.
pub const DEFAULT_STATUS_TIMEOUT: Duration = Duration::from_secs(5);

/// GorillaPool mainnet ARC endpoint.
pub const GORILLAPOOL_URL: &str = "https://arc.gorillapool.io/v1";
/// GorillaPool testnet ARC endpoint.
pub const GORILLAPOOL_TESTNET_URL: &str = "https://testnet.arc.gorillapool.io/v1";
/// TAAL mainnet ARC endpoint.
pub const TAAL_URL: &str = "https://arc.taal.com/v1";
/// TAAL testnet ARC endpoint.
pub const TAAL_TESTNET_URL: &str = "https://arc-test.taal.com/v1";

/// ARC transaction status codes, as accepted by `X-WaitForStatus`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ArcStatus {
    /// Transaction was rejected.
    Rejected,
    /// Transaction is queued for processing.
    Queued,
    /// Transaction was received by ARC.
    Received,
    /// Transaction has been stored.
    Stored,
    /// Transaction announced to the network.
    AnnouncedToNetwork,
    /// Transaction requested by the network.
    RequestedByNetwork,
    /// Transaction sent to the network.
    SentToNetwork,
    /// Transaction accepted by the network.
    AcceptedByNetwork,
    /// Transaction seen on the network.
    SeenOnNetwork,
    /// Transaction has been mined.
    Mined,
    /// Transaction has been confirmed.
    Confirmed,
    /// A double-spend was attempted.
    DoubleSpendAttempted,
    /// Transaction seen in orphan mempool.
    SeenInOrphanMempool,
}

impl ArcStatus {
    /// The integer code sent in `X-WaitForStatus`.
    pub fn as_code(&self) -> i32 {
        match self {
            Self::Rejected => 0,
            Self::Queued => 1,
            Self::Received => 2,
            Self::Stored => 3,
            Self::AnnouncedToNetwork => 4,
            Self::RequestedByNetwork => 5,
            Self::SentToNetwork => 6,
            Self::AcceptedByNetwork => 7,
            Self::SeenOnNetwork => 8,
            Self::Mined => 9,
            Self::Confirmed => 10,
            Self::DoubleSpendAttempted => 11,
            Self::SeenInOrphanMempool => 12,
        }
    }
}

impl std::fmt::Display for ArcStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = serde_json::to_value(self)
            .ok()
            .and_then(|v| v.as_str().map(String::from))
            .unwrap_or_default();
        write!(f, "{s}")
    }
}

/// Configuration for an [`ArcClient`](crate::ArcClient).
#[derive(Debug, Clone)]
pub struct ArcConfig {
    /// Base URL for the ARC API, including the version segment.
    pub base_url: String,
    /// Optional Bearer token for authentication.
    pub api_key: Option<String>,
    /// Value of `XDeployment-ID`. A random `rs-sdk-<hex>` id is used when unset.
    pub deployment_id: Option<String>,
    /// Callback URL for status notifications.
    pub callback_url: Option<String>,
    /// Token sent with callbacks for verification.
    pub callback_token: Option<String>,
    /// Extra headers sent with every request. They override the built-in ones.
    pub headers: HashMap<String, String>,
    /// Time allowed for a broadcast request.
    pub timeout: Duration,
    /// Time allowed for a status query.
    pub status_timeout: Duration,
    /// Wait for transaction to reach this status before returning.
    pub wait_for_status: Option<ArcStatus>,
    /// Skip fee validation.
    pub skip_fee_validation: bool,
    /// Skip script validation.
    pub skip_script_validation: bool,
    /// Skip transaction validation.
    pub skip_tx_validation: bool,
    /// Use cumulative fee validation.
    pub cumulative_fee_validation: bool,
    /// Request full status updates via callback.
    pub full_status_updates: bool,
    /// Maximum timeout in seconds.
    pub max_timeout: Option<u32>,
}

impl Default for ArcConfig {
    fn default() -> Self {
        Self {
            base_url: GORILLAPOOL_URL.to_string(),
            api_key: None,
            deployment_id: None,
            callback_url: None,
            callback_token: None,
            headers: HashMap::new(),
            timeout: DEFAULT_TIMEOUT,
            status_timeout: DEFAULT_STATUS_TIMEOUT,
            wait_for_status: None,
            skip_fee_validation: false,
            skip_script_validation: false,
            skip_tx_validation: false,
            cumulative_fee_validation: false,
            full_status_updates: false,
            max_timeout: None,
        }
    }
}

impl ArcConfig {
    /// Defaults pointed at `base_url`.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// GorillaPool mainnet, no API key needed.
    pub fn gorillapool() -> Self {
        Self::with_base_url(GORILLAPOOL_URL)
    }

    /// GorillaPool testnet, no API key needed.
    pub fn gorillapool_testnet() -> Self {
        Self::with_base_url(GORILLAPOOL_TESTNET_URL)
    }

    /// TAAL mainnet. TAAL requires an API key to broadcast.
    pub fn taal(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
            ..Self::with_base_url(TAAL_URL)
        }
    }

    /// TAAL testnet. TAAL requires an API key to broadcast.
    pub fn taal_testnet(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
            ..Self::with_base_url(TAAL_TESTNET_URL)
        }
    }
}

/// Response body of `POST /tx`, and of most ARC errors.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArcResponse {
    /// Transaction ID.
    #[serde(default)]
    pub txid: Option<String>,
    /// Transaction status string (e.g. `MINED`).
    #[serde(default)]
    pub tx_status: Option<String>,
    /// Upstream status code, a number on ARC errors.
    #[serde(default)]
    pub status: Option<serde_json::Value>,
    /// Response title.
    #[serde(default)]
    pub title: Option<String>,
    /// Block hash if mined.
    #[serde(default)]
    pub block_hash: Option<String>,
    /// Block height if mined.
    #[serde(default)]
    pub block_height: Option<u64>,
    /// Extra information from the node.
    #[serde(default)]
    pub extra_info: Option<String>,
    /// Timestamp of the response.
    #[serde(default)]
    pub timestamp: Option<String>,
    /// ARC instance identifier.
    #[serde(default)]
    pub instance: Option<String>,
    /// Detail/error message.
    #[serde(default)]
    pub detail: Option<String>,
    /// Merkle path for SPV proof.
    #[serde(default)]
    pub merkle_path: Option<String>,
}

impl ArcResponse {
    /// The upstream `status` as a failure code. Strings are taken verbatim.
    pub fn status_code(&self) -> Option<String> {
        self.status.as_ref().map(|status| match status {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        })
    }
}

/// Result of `GET /tx/{txid}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TxStatusReport {
    /// The queried transaction ID.
    #[serde(default)]
    pub txid: String,
    /// Transaction status string (e.g. `SEEN_ON_NETWORK`).
    #[serde(default)]
    pub tx_status: Option<String>,
    /// Block hash if mined.
    #[serde(default)]
    pub block_hash: Option<String>,
    /// Block height if mined.
    #[serde(default)]
    pub block_height: Option<u64>,
    /// Merkle path for SPV proof.
    #[serde(default)]
    pub merkle_path: Option<String>,
    /// Extra information from the node.
    #[serde(default)]
    pub extra_info: Option<String>,
    /// IDs of transactions spending the same outputs.
    #[serde(default)]
    pub competing_txs: Option<Vec<String>>,
    /// Timestamp of the status.
    #[serde(default)]
    pub timestamp: Option<String>,
}
