use async_trait::async_trait;
use config_manager::GmgnConfig;
use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::{Client, StatusCode};
use retry_utils::{parse_retry_after, retry_with_backoff, RetryConfig, RetryableError};
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;
use wallet_core::{WalletAddress, WalletPnl};

#[derive(Error, Debug)]
pub enum GmgnError {
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

pub type Result<T> = std::result::Result<T, GmgnError>;

impl GmgnError {
    pub fn retry_classification(&self) -> RetryableError {
        match self {
            GmgnError::RateLimitExceeded { retry_after } => RetryableError::RateLimit {
                retry_after: *retry_after,
            },
            _ => RetryableError::Other,
        }
    }
}

/// Per-wallet PnL statistics lookup
#[async_trait]
pub trait PnlLookup: Send + Sync {
    /// `Ok(None)` when the service answers without a `data` object
    async fn wallet_pnl(&self, wallet: &WalletAddress) -> Result<Option<WalletPnl>>;
}

#[derive(Debug, Deserialize)]
struct GmgnEnvelope {
    #[serde(default)]
    code: Option<i64>,
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    data: Option<WalletPnl>,
}

/// GMGN smart-money wallet statistics client
#[derive(Debug, Clone)]
pub struct GmgnClient {
    http_client: Client,
    config: GmgnConfig,
    retry: RetryConfig,
}

impl GmgnClient {
    pub fn new(config: GmgnConfig, retry: RetryConfig) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .user_agent("early-buyer-finder/1.0")
            .build()
            .map_err(|e| GmgnError::ConfigError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            config,
            retry,
        })
    }

    fn wallet_url(&self, wallet: &WalletAddress) -> String {
        format!(
            "{}/defi/quotation/v1/smartmoney/sol/walletNew/{}",
            self.config.api_base_url.trim_end_matches('/'),
            wallet
        )
    }

    pub async fn get_wallet_stats(&self, wallet: &WalletAddress) -> Result<Option<WalletPnl>> {
        let body = retry_with_backoff(
            || self.get_wallet_body(wallet),
            &self.retry,
            GmgnError::retry_classification,
        )
        .await?;

        parse_wallet_body(&body, wallet)
    }

    async fn get_wallet_body(&self, wallet: &WalletAddress) -> Result<String> {
        let response = self.http_client.get(self.wallet_url(wallet)).send().await?;

        let status = response.status();
        if let Some(rate_limited) = rate_limit_error(status, response.headers()) {
            return Err(rate_limited);
        }

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(GmgnError::ApiError {
                status: status.as_u16(),
                message: error_text,
            });
        }

        Ok(response.text().await?)
    }
}

#[async_trait]
impl PnlLookup for GmgnClient {
    async fn wallet_pnl(&self, wallet: &WalletAddress) -> Result<Option<WalletPnl>> {
        self.get_wallet_stats(wallet).await
    }
}

fn rate_limit_error(status: StatusCode, headers: &HeaderMap) -> Option<GmgnError> {
    if status != StatusCode::TOO_MANY_REQUESTS {
        return None;
    }

    let retry_after = parse_retry_after(headers.get(RETRY_AFTER).and_then(|v| v.to_str().ok()));
    Some(GmgnError::RateLimitExceeded { retry_after })
}

fn parse_wallet_body(body: &str, wallet: &WalletAddress) -> Result<Option<WalletPnl>> {
    let envelope: GmgnEnvelope = serde_json::from_str(body)?;

    match envelope.data {
        Some(stats) => Ok(Some(stats.with_wallet(wallet.clone()))),
        None => {
            debug!(
                "GMGN returned no data for {} (code {:?}, msg {:?})",
                wallet, envelope.code, envelope.msg
            );
            Ok(None)
        }
    }
}
