use async_trait::async_trait;
use config_manager::HeliusConfig;
use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::{Client, StatusCode};
use retry_utils::{parse_retry_after, retry_with_backoff, RetryConfig, RetryableError};
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};
use wallet_core::EnrichedTransaction;

#[derive(Error, Debug)]
pub enum HeliusError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),
    #[error("JSON parsing failed: {0}")]
    JsonParsingFailed(#[from] serde_json::Error),
    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },
    #[error("Rate limit exceeded")]
    RateLimitExceeded { retry_after: Option<Duration> },
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

pub type Result<T> = std::result::Result<T, HeliusError>;

impl HeliusError {
    pub fn retry_classification(&self) -> RetryableError {
        match self {
            HeliusError::RateLimitExceeded { retry_after } => RetryableError::RateLimit {
                retry_after: *retry_after,
            },
            _ => RetryableError::Other,
        }
    }
}

/// Bulk signature → enhanced transaction lookup
#[async_trait]
pub trait TransactionLookup: Send + Sync {
    async fn lookup_batch(&self, signatures: &[String]) -> Result<Vec<EnrichedTransaction>>;
}

#[derive(Serialize)]
struct TransactionsRequest<'a> {
    transactions: &'a [String],
}

/// Helius API client for fetching enhanced transaction data
#[derive(Debug, Clone)]
pub struct HeliusClient {
    /// HTTP client for making requests
    http_client: Client,

    /// Helius API configuration
    config: HeliusConfig,

    retry: RetryConfig,
}

impl HeliusClient {
    /// Create a new Helius client with the given configuration
    pub fn new(config: HeliusConfig, retry: RetryConfig) -> Result<Self> {
        if config.api_key.is_empty() {
            return Err(HeliusError::ConfigError(
                "Helius API key is required".to_string(),
            ));
        }

        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .user_agent("early-buyer-finder/1.0")
            .build()
            .map_err(|e| HeliusError::ConfigError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            config,
            retry,
        })
    }

    fn transactions_url(&self) -> String {
        format!("{}/transactions", self.config.api_base_url.trim_end_matches('/'))
    }

    /// Parse enhanced transactions for up to 100 signatures in one request
    pub async fn parse_transactions(&self, signatures: &[String]) -> Result<Vec<EnrichedTransaction>> {
        if signatures.is_empty() {
            return Ok(Vec::new());
        }

        retry_with_backoff(
            || self.post_transactions(signatures),
            &self.retry,
            HeliusError::retry_classification,
        )
        .await
    }

    async fn post_transactions(&self, signatures: &[String]) -> Result<Vec<EnrichedTransaction>> {
        debug!("Requesting {} enhanced transactions from Helius", signatures.len());

        let response = self
            .http_client
            .post(self.transactions_url())
            .query(&[("api-key", self.config.api_key.as_str())])
            .json(&TransactionsRequest {
                transactions: signatures,
            })
            .send()
            .await?;

        let status = response.status();
        if let Some(rate_limited) = rate_limit_error(status, response.headers()) {
            return Err(rate_limited);
        }

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(HeliusError::ApiError {
                status: status.as_u16(),
                message: error_text,
            });
        }

        let body = response.text().await?;
        parse_transactions_body(&body)
    }
}

#[async_trait]
impl TransactionLookup for HeliusClient {
    async fn lookup_batch(&self, signatures: &[String]) -> Result<Vec<EnrichedTransaction>> {
        self.parse_transactions(signatures).await
    }
}

/// A 429 becomes `RateLimitExceeded` carrying the `Retry-After` interval
fn rate_limit_error(status: StatusCode, headers: &HeaderMap) -> Option<HeliusError> {
    if status != StatusCode::TOO_MANY_REQUESTS {
        return None;
    }

    let retry_after = parse_retry_after(headers.get(RETRY_AFTER).and_then(|v| v.to_str().ok()));
    Some(HeliusError::RateLimitExceeded { retry_after })
}

/// Unknown signatures come back as `null` entries and are dropped.
/// An entry that does not match the expected shape is skipped on its own.
fn parse_transactions_body(body: &str) -> Result<Vec<EnrichedTransaction>> {
    let entries: Vec<Value> = serde_json::from_str(body)?;
    let total = entries.len();
    let mut nulls = 0;
    let mut transactions = Vec::with_capacity(total);

    for (index, entry) in entries.into_iter().enumerate() {
        if entry.is_null() {
            nulls += 1;
            continue;
        }

        match serde_json::from_value::<EnrichedTransaction>(entry) {
            Ok(tx) => transactions.push(tx),
            Err(e) => warn!("Skipping malformed Helius entry {} of {}: {}", index + 1, total, e),
        }
    }

    if nulls > 0 {
        warn!("Helius returned {} null entries out of {}", nulls, total);
    }

    Ok(transactions)
}
