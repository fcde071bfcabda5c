//! ARC HTTP client for broadcasting and querying transactions.

use std::future::Future;
use std::time::Duration;

use bsv_transaction::{AsyncBroadcaster, BroadcastFailure, BroadcastSuccess, Broadcaster};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION};
use reqwest::StatusCode;
use tracing::{debug, warn};

use crate::error::{ArcError, CONNECT_FAILURE};
use crate::types::{ArcConfig, ArcResponse, TxStatusReport, GORILLAPOOL_TESTNET_URL, GORILLAPOOL_URL};

const BROADCAST_ACTION: &str = "Transaction broadcast";
const STATUS_ACTION: &str = "Transaction status check";
const UNKNOWN_ERROR: &str = "Unknown error";

/// A fresh `rs-sdk-<32 hex chars>` deployment id.
pub fn default_deployment_id() -> String {
    let bytes: [u8; 16] = rand::random();
    format!("rs-sdk-{}", hex::encode(bytes))
}

/// A GorillaPool client for the chosen network.
///
/// A supplied config keeps all of its settings except `base_url`.
pub fn default_broadcaster(is_testnet: bool, config: Option<ArcConfig>) -> ArcClient {
    let base_url = if is_testnet {
        GORILLAPOOL_TESTNET_URL
    } else {
        GORILLAPOOL_URL
    };
    let config = match config {
        Some(config) => ArcConfig {
            base_url: base_url.to_string(),
            ..config
        },
        None => ArcConfig::with_base_url(base_url),
    };
    ArcClient::new(config)
}

/// HTTP client for the ARC API.
#[derive(Debug, Clone)]
pub struct ArcClient {
    /// Client configuration.
    config: ArcConfig,
    /// Resolved `XDeployment-ID`.
    deployment_id: String,
    /// Underlying HTTP client.
    client: reqwest::Client,
}

impl ArcClient {
    /// Create a new ARC client with the given configuration.
    pub fn new(config: ArcConfig) -> Self {
        let deployment_id = config
            .deployment_id
            .clone()
            .unwrap_or_else(default_deployment_id);
        Self {
            config,
            deployment_id,
            client: reqwest::Client::new(),
        }
    }

    /// The configuration this client was built with.
    pub fn config(&self) -> &ArcConfig {
        &self.config
    }

    /// The `XDeployment-ID` sent with every request.
    pub fn deployment_id(&self) -> &str {
        &self.deployment_id
    }

    /// Submit raw transaction bytes to `POST {base_url}/tx`.
    pub async fn submit(&self, raw_tx: &[u8]) -> Result<BroadcastSuccess, BroadcastFailure> {
        let timeout = self.config.timeout;
        let result = match self.post_tx(raw_tx).await {
            Ok((status, body)) => interpret_broadcast(status, &body, timeout),
            Err(e) => Err(e.into_failure(BROADCAST_ACTION, timeout)),
        };
        match &result {
            Ok(success) => debug!(txid = %success.txid, message = %success.message, "ARC accepted transaction"),
            Err(failure) => warn!(code = %failure.code, description = %failure.description, "ARC broadcast failed"),
        }
        result
    }

    /// Query `GET {base_url}/tx/{txid}`.
    pub async fn check_status(&self, txid: &str) -> Result<TxStatusReport, BroadcastFailure> {
        let timeout = self.config.status_timeout;
        let (status, body) = self
            .get_status(txid)
            .await
            .map_err(|e| e.into_failure(STATUS_ACTION, timeout))?;
        let result = interpret_status(txid, status, &body, timeout);
        if let Err(failure) = &result {
            warn!(txid, code = %failure.code, description = %failure.description, "ARC status query failed");
        }
        result
    }

    /// Blocking [`ArcClient::check_status`].
    ///
    /// Must not be called from a current-thread tokio runtime.
    pub fn check_status_blocking(&self, txid: &str) -> Result<TxStatusReport, BroadcastFailure> {
        block_on(self.check_status(txid))
            .unwrap_or_else(|e| Err(e.into_failure(STATUS_ACTION, self.config.status_timeout)))
    }

    async fn post_tx(&self, raw_tx: &[u8]) -> Result<(StatusCode, String), ArcError> {
        let url = format!("{}/tx", self.config.base_url);
        debug!(url = %url, size = raw_tx.len(), "broadcasting transaction");
        let body = serde_json::json!({ "rawTx": hex::encode(raw_tx) });

        let resp = self
            .client
            .post(&url)
            .headers(self.build_headers())
            .timeout(self.config.timeout)
            .json(&body)
            .send()
            .await?;
        let status = resp.status();
        Ok((status, resp.text().await?))
    }

    async fn get_status(&self, txid: &str) -> Result<(StatusCode, String), ArcError> {
        let url = format!("{}/tx/{}", self.config.base_url, txid);
        debug!(url = %url, "querying transaction status");

        let resp = self
            .client
            .get(&url)
            .headers(self.build_headers())
            .timeout(self.config.status_timeout)
            .send()
            .await?;
        let status = resp.status();
        Ok((status, resp.text().await?))
    }

    /// Build common headers from config. Custom headers are applied last.
    fn build_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();

        if let Ok(val) = HeaderValue::from_str(&self.deployment_id) {
            headers.insert("XDeployment-ID", val);
        }

        if let Some(ref key) = self.config.api_key {
            if let Ok(val) = HeaderValue::from_str(&format!("Bearer {key}")) {
                headers.insert(AUTHORIZATION, val);
            }
        }

        if let Some(ref url) = self.config.callback_url {
            if let Ok(val) = HeaderValue::from_str(url) {
                headers.insert("X-CallbackUrl", val);
            }
        }

        if let Some(ref token) = self.config.callback_token {
            if let Ok(val) = HeaderValue::from_str(token) {
                headers.insert("X-CallbackToken", val);
            }
        }

        if let Some(ref status) = self.config.wait_for_status {
            if let Ok(val) = HeaderValue::from_str(&status.as_code().to_string()) {
                headers.insert("X-WaitForStatus", val);
            }
        }

        if self.config.skip_fee_validation {
            headers.insert("X-SkipFeeValidation", HeaderValue::from_static("true"));
        }

        if self.config.skip_script_validation {
            headers.insert("X-SkipScriptValidation", HeaderValue::from_static("true"));
        }

        if self.config.skip_tx_validation {
            headers.insert("X-SkipTxValidation", HeaderValue::from_static("true"));
        }

        if self.config.cumulative_fee_validation {
            headers.insert("X-CumulativeFeeValidation", HeaderValue::from_static("true"));
        }

        if self.config.full_status_updates {
            headers.insert("X-FullStatusUpdates", HeaderValue::from_static("true"));
        }

        if let Some(timeout) = self.config.max_timeout {
            if let Ok(val) = HeaderValue::from_str(&timeout.to_string()) {
                headers.insert("X-MaxTimeout", val);
            }
        }

        for (name, value) in &self.config.headers {
            match (
                HeaderName::from_bytes(name.as_bytes()),
                HeaderValue::from_str(value),
            ) {
                (Ok(name), Ok(value)) => {
                    headers.insert(name, value);
                }
                _ => warn!(header = %name, "skipping invalid custom header"),
            }
        }

        headers
    }
}

impl AsyncBroadcaster for ArcClient {
    async fn broadcast_async(&self, raw_tx: &[u8]) -> Result<BroadcastSuccess, BroadcastFailure> {
        self.submit(raw_tx).await
    }
}

impl Broadcaster for ArcClient {
    /// Must not be called from a current-thread tokio runtime.
    fn broadcast(&self, raw_tx: &[u8]) -> Result<BroadcastSuccess, BroadcastFailure> {
        block_on(self.submit(raw_tx))
            .unwrap_or_else(|e| Err(e.into_failure(BROADCAST_ACTION, self.config.timeout)))
    }
}

/// Drive a future to completion from synchronous code.
fn block_on<F: Future>(future: F) -> Result<F::Output, ArcError> {
    match tokio::runtime::Handle::try_current() {
        // Inside a multi-threaded runtime: block this worker in place.
        Ok(handle) => Ok(tokio::task::block_in_place(|| handle.block_on(future))),
        // No runtime, create one.
        Err(_) => {
            let rt = tokio::runtime::Runtime::new()?;
            Ok(rt.block_on(future))
        }
    }
}

/// Map a `POST /tx` response to a broadcast result.
pub(crate) fn interpret_broadcast(
    status: StatusCode,
    body: &str,
    timeout: Duration,
) -> Result<BroadcastSuccess, BroadcastFailure> {
    if !status.is_success() {
        return Err(failure_for_status(status, body, BROADCAST_ACTION, timeout));
    }
    let data: ArcResponse = serde_json::from_str(body)
        .map_err(|e| ArcError::from(e).into_failure(BROADCAST_ACTION, timeout))?;
    match data.txid.as_deref().filter(|txid| !txid.is_empty()) {
        Some(txid) => {
            let message = format!(
                "{} {}",
                data.tx_status.as_deref().unwrap_or_default(),
                data.extra_info.as_deref().unwrap_or_default()
            );
            Ok(BroadcastSuccess {
                txid: txid.to_string(),
                message: message.trim().to_string(),
            })
        }
        None => Err(BroadcastFailure::new(
            data.status_code().unwrap_or_else(|| "ERR_UNKNOWN".to_string()),
            data.detail.unwrap_or_else(|| UNKNOWN_ERROR.to_string()),
        )),
    }
}

/// Map a `GET /tx/{txid}` response to a status report.
pub(crate) fn interpret_status(
    txid: &str,
    status: StatusCode,
    body: &str,
    timeout: Duration,
) -> Result<TxStatusReport, BroadcastFailure> {
    if !status.is_success() {
        return Err(failure_for_status(status, body, STATUS_ACTION, timeout));
    }
    let mut report: TxStatusReport = serde_json::from_str(body)
        .map_err(|e| ArcError::from(e).into_failure(STATUS_ACTION, timeout))?;
    if report.txid.is_empty() {
        report.txid = txid.to_string();
    }
    Ok(report)
}

/// Failure for a non-2xx response. Unparseable bodies fall back to
/// `Unknown error`.
fn failure_for_status(
    status: StatusCode,
    body: &str,
    action: &str,
    timeout: Duration,
) -> BroadcastFailure {
    match status {
        StatusCode::REQUEST_TIMEOUT => BroadcastFailure::new(
            "408",
            format!("{} timed out after {} seconds", action, timeout.as_secs()),
        ),
        StatusCode::SERVICE_UNAVAILABLE => BroadcastFailure::new("503", CONNECT_FAILURE),
        _ => {
            let data: ArcResponse = serde_json::from_str(body).unwrap_or_default();
            BroadcastFailure::new(
                status.as_u16().to_string(),
                data.detail.unwrap_or_else(|| UNKNOWN_ERROR.to_string()),
            )
        }
    }
}
