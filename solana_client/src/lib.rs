// Solana RPC client for token signature history

use async_trait::async_trait;
use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::{Client, StatusCode};
use retry_utils::{parse_retry_after, retry_with_backoff, RetryConfig, RetryableError};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;
use wallet_core::Signature;

pub mod signature_pager;

pub use signature_pager::{PagerCompletion, SignatureHistory, SignaturePager};

/// Largest page `getSignaturesForAddress` accepts
pub const MAX_SIGNATURE_PAGE: u32 = 1000;

#[derive(Error, Debug)]
pub enum SolanaClientError {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },
    #[error("Rate limited by RPC provider")]
    RateLimited { retry_after: Option<Duration> },
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
    #[error("RPC response carried neither result nor error")]
    MissingResult,
}

pub type Result<T> = std::result::Result<T, SolanaClientError>;

impl SolanaClientError {
    pub fn retry_classification(&self) -> RetryableError {
        match self {
            SolanaClientError::RateLimited { retry_after } => RetryableError::RateLimit {
                retry_after: *retry_after,
            },
            _ => RetryableError::Other,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolanaClientConfig {
    /// Full RPC URL, key included
    pub rpc_url: String,
    /// Request timeout in seconds
    pub rpc_timeout_seconds: u64,
    /// Rate-limit retry policy
    pub retry: RetryConfig,
}

impl Default for SolanaClientConfig {
    fn default() -> Self {
        Self {
            rpc_url: "https://api.mainnet-beta.solana.com".to_string(),
            rpc_timeout_seconds: 30,
            retry: RetryConfig::default(),
        }
    }
}

/// Solana RPC response envelope
#[derive(Debug, Deserialize)]
pub struct RpcResponse<T> {
    pub jsonrpc: String,
    pub id: u64,
    pub result: Option<T>,
    pub error: Option<RpcError>,
}

#[derive(Debug, Deserialize)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
}

/// Source of signature pages, newest first
#[async_trait]
pub trait SignatureSource: Send + Sync {
    /// Up to `limit` signatures for `address` older than `before`
    /// (most recent when `before` is `None`).
    async fn signatures_before(
        &self,
        address: &str,
        before: Option<&str>,
        limit: u32,
    ) -> Result<Vec<Signature>>;
}

/// Main Solana RPC Client
#[derive(Clone)]
pub struct SolanaClient {
    config: SolanaClientConfig,
    http_client: Client,
    request_id_counter: Arc<AtomicU64>,
}

impl SolanaClient {
    pub fn new(config: SolanaClientConfig) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.rpc_timeout_seconds))
            .build()?;

        Ok(Self {
            config,
            http_client,
            request_id_counter: Arc::new(AtomicU64::new(1)),
        })
    }

    fn next_request_id(&self) -> u64 {
        self.request_id_counter.fetch_add(1, Ordering::SeqCst)
    }

    /// Get signatures for address - matches Solana RPC getSignaturesForAddress
    pub async fn get_signatures_for_address(
        &self,
        address: &str,
        before: Option<&str>,
        limit: u32,
    ) -> Result<Vec<Signature>> {
        let params = signature_request_params(address, before, limit);

        let response = retry_with_backoff(
            || self.rpc_request("getSignaturesForAddress", params.clone()),
            &self.config.retry,
            SolanaClientError::retry_classification,
        )
        .await?;

        parse_signature_response(response)
    }

    /// Single JSON-RPC round trip; a 429 comes back as `RateLimited`
    async fn rpc_request(&self, method: &str, params: Value) -> Result<RpcResponse<Value>> {
        let request_body = json!({
            "jsonrpc": "2.0",
            "id": self.next_request_id(),
            "method": method,
            "params": params
        });

        let response = self
            .http_client
            .post(&self.config.rpc_url)
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        if let Some(rate_limited) = rate_limit_error(status, response.headers()) {
            return Err(rate_limited);
        }

        if !status.is_success() {
            return Err(SolanaClientError::InvalidResponse(format!("HTTP {}", status)));
        }

        let rpc_response: RpcResponse<Value> = response.json().await?;
        debug!("{} answered request id {}", method, rpc_response.id);
        Ok(rpc_response)
    }
}

#[async_trait]
impl SignatureSource for SolanaClient {
    async fn signatures_before(
        &self,
        address: &str,
        before: Option<&str>,
        limit: u32,
    ) -> Result<Vec<Signature>> {
        self.get_signatures_for_address(address, before, limit).await
    }
}

/// A 429 becomes `RateLimited` carrying the `Retry-After` interval
fn rate_limit_error(status: StatusCode, headers: &HeaderMap) -> Option<SolanaClientError> {
    if status != StatusCode::TOO_MANY_REQUESTS {
        return None;
    }

    let retry_after = parse_retry_after(headers.get(RETRY_AFTER).and_then(|v| v.to_str().ok()));
    Some(SolanaClientError::RateLimited { retry_after })
}

fn signature_request_params(address: &str, before: Option<&str>, limit: u32) -> Value {
    let mut options = serde_json::Map::new();
    options.insert("limit".to_string(), json!(limit.min(MAX_SIGNATURE_PAGE)));
    if let Some(before_sig) = before {
        options.insert("before".to_string(), json!(before_sig));
    }

    json!([address, options])
}

fn parse_signature_response(response: RpcResponse<Value>) -> Result<Vec<Signature>> {
    if let Some(error) = response.error {
        return Err(SolanaClientError::Rpc {
            code: error.code,
            message: error.message,
        });
    }

    match response.result {
        Some(result) => Ok(serde_json::from_value(result)?),
        None => Err(SolanaClientError::MissingResult),
    }
}
