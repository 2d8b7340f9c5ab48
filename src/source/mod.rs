//! Data sources fetched by the importer.
//!
//! Each source knows how to build its request (endpoint, auth, retry
//! budget, accepted statuses) and which file its payload lands in; the
//! importer stays generic over the trait.

mod github;
mod medium;

use anyhow::Result;
use async_trait::async_trait;

use crate::http::HttpClient;

pub use github::GithubSource;
pub use medium::MediumSource;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Source: Send + Sync {
    /// Human-readable name used in log messages.
    fn description(&self) -> &'static str;

    /// File name of the payload under the output directory.
    fn file_name(&self) -> &'static str;

    /// Fetches the raw response body, retrying per the source's budget.
    async fn fetch(&self, http: &HttpClient) -> Result<String>;
}
