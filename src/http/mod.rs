//! HTTP client module with retry logic and error handling.

mod client;
mod retry;

pub use client::{HttpClient, RequestSpec};
pub use retry::{DEFAULT_BASE_DELAY_MS, DEFAULT_MAX_ATTEMPTS, FetchError, RetryPolicy, with_retry};
