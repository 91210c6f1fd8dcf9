use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, error, warn};

/// Classification of errors for retry strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryableError {
    /// 429 Rate Limit - retry after the provider interval, or the default delay
    RateLimit { retry_after: Option<Duration> },
    /// Everything else - hand back to the caller
    Other,
}

/// Configuration for rate-limit retry behavior
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RetryConfig {
    /// Maximum number of retries (not including the initial attempt).
    /// `None` retries for as long as the provider keeps rate limiting.
    pub max_attempts: Option<u32>,
    /// Delay used when the provider sends no Retry-After interval
    pub default_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: None,
            default_delay_ms: 1000,
        }
    }
}

impl RetryConfig {
    /// Delay before the next attempt for a classified error
    fn get_delay(&self, error_type: RetryableError) -> Option<Duration> {
        match error_type {
            RetryableError::RateLimit { retry_after } => {
                Some(retry_after.unwrap_or(Duration::from_millis(self.default_delay_ms)))
            }
            RetryableError::Other => None,
        }
    }

    fn exhausted(&self, retries: u32) -> bool {
        self.max_attempts.is_some_and(|max| retries >= max)
    }
}

/// Parse a `Retry-After` header value given in whole seconds.
pub fn parse_retry_after(value: Option<&str>) -> Option<Duration> {
    value
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}

/// Retry an async operation while it keeps reporting rate limits
///
/// # Arguments
/// * `operation` - The async operation to retry (a closure returning a Future)
/// * `config` - Retry configuration
/// * `classify_error` - Maps an error to a retry decision
///
/// # Returns
/// * `Ok(T)` - Operation succeeded (first attempt or after waiting out rate limits)
/// * `Err(E)` - Non-retryable error, or the configured cap was reached
///
/// # Example
/// ```ignore
/// let result = retry_with_backoff(
///     || async { my_api_call().await },
///     &RetryConfig::default(),
///     |e| match e.retry_after() {
///         Some(after) => RetryableError::RateLimit { retry_after: after },
///         None => RetryableError::Other,
///     },
/// ).await;
/// ```
pub async fn retry_with_backoff<F, Fut, T, E>(
    mut operation: F,
    config: &RetryConfig,
    classify_error: impl Fn(&E) -> RetryableError,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let mut retries = 0u32;

    loop {
        match operation().await {
            Ok(result) => {
                if retries > 0 {
                    debug!("Operation succeeded after {} rate-limit retries", retries);
                }
                return Ok(result);
            }
            Err(e) => {
                let error_type = classify_error(&e);

                let delay = match config.get_delay(error_type) {
                    Some(d) => d,
                    None => {
                        error!("Operation failed with non-retryable error: {}", e);
                        return Err(e);
                    }
                };

                if config.exhausted(retries) {
                    error!(
                        "Operation still rate limited after {} attempts, giving up: {}",
                        retries + 1,
                        e
                    );
                    return Err(e);
                }

                warn!(
                    "Rate limit exceeded. Waiting {} ms before retrying (attempt {})",
                    delay.as_millis(),
                    retries + 1
                );

                tokio::time::sleep(delay).await;

                retries += 1;
            }
        }
    }
}
