//! Retry policy for network operations with exponential backoff.

use std::time::Duration;

use log::{debug, error, warn};
use reqwest::StatusCode;

/// Maximum number of attempts for a fetch, unless a caller overrides it.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Base delay before the first retry, in milliseconds.
pub const DEFAULT_BASE_DELAY_MS: u64 = 1000;

/// How many attempts a fetch gets and how long to wait between them.
///
/// Delays grow exponentially: the wait before attempt `n` (n >= 2) is
/// `base_delay * 2^(n - 2)`, so with the defaults a three-attempt fetch
/// sleeps 1s and then 2s.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay: Duration::from_millis(DEFAULT_BASE_DELAY_MS),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
        }
    }

    /// Delay to apply before the given attempt. Attempt numbering starts
    /// at 1; the first attempt is issued immediately.
    pub fn delay_before(&self, attempt: u32) -> Duration {
        if attempt < 2 {
            return Duration::ZERO;
        }
        self.base_delay * 2u32.pow(attempt - 2)
    }
}

/// A single failed fetch attempt.
#[derive(Debug)]
pub enum FetchError {
    /// The server answered with a status code outside the accepted set.
    Status(StatusCode),
    /// The request never produced a usable response (DNS failure,
    /// connection reset, timeout, truncated body).
    Transport(reqwest::Error),
}

impl FetchError {
    /// HTTP status code of the failed attempt, when one was received.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            FetchError::Status(status) => Some(*status),
            FetchError::Transport(e) => e.status(),
        }
    }
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchError::Status(status) => {
                write!(f, "request failed with status code: {}", status.as_u16())
            }
            FetchError::Transport(e) => write!(f, "request error: {}", e),
        }
    }
}

impl std::error::Error for FetchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FetchError::Status(_) => None,
            FetchError::Transport(e) => Some(e),
        }
    }
}

/// Executes an async operation with exponential-backoff retry.
///
/// Attempts are strictly serialized; a new attempt is only issued after
/// the previous one has definitively failed and the budget allows it.
/// Exhausting the budget yields the last error, annotated with the HTTP
/// status code when one was received.
pub async fn with_retry<F, Fut, T>(
    operation_name: &str,
    policy: RetryPolicy,
    operation: F,
) -> anyhow::Result<T>
where
    F: Fn() -> Fut,
    Fut: std::future::Future<Output = Result<T, FetchError>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut last_error = None;

    for attempt in 1..=max_attempts {
        let delay = policy.delay_before(attempt);
        if !delay.is_zero() {
            warn!("{}: retrying in {}ms...", operation_name, delay.as_millis());
            tokio::time::sleep(delay).await;
        }

        debug!("{}: attempt {}/{}", operation_name, attempt, max_attempts);

        match operation().await {
            Ok(result) => {
                debug!("{}: attempt {} succeeded", operation_name, attempt);
                return Ok(result);
            }
            Err(e) => {
                warn!(
                    "{}: attempt {}/{} failed ({})",
                    operation_name, attempt, max_attempts, e
                );
                last_error = Some(e);
            }
        }
    }

    let last = last_error.expect("at least one attempt was made");
    error!(
        "{}: max attempts ({}) reached, giving up",
        operation_name, max_attempts
    );
    Err(anyhow::Error::from(last).context(format!(
        "{} failed after {} attempts",
        operation_name, max_attempts
    )))
}
