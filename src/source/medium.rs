//! Medium blog data via the rss2json conversion API.

use anyhow::{Context, Result};
use async_trait::async_trait;
use log::info;
use reqwest::Url;
use std::time::Duration;

use super::Source;
use crate::config::MediumConfig;
use crate::http::{HttpClient, RequestSpec, RetryPolicy};

pub const DEFAULT_API_URL: &str = "https://api.rss2json.com";

/// Smaller budget than GitHub: the rss2json API rate-limits aggressively
/// and the data is non-critical anyway.
const MAX_ATTEMPTS: u32 = 2;
const BASE_DELAY: Duration = Duration::from_millis(2000);

/// Fetches the user's Medium feed converted to JSON, written verbatim to
/// `blogs.json`.
pub struct MediumSource {
    username: String,
    api_url: String,
    policy: RetryPolicy,
}

impl MediumSource {
    pub fn new(config: &MediumConfig, api_url: Option<String>) -> Self {
        Self {
            username: config.username.clone(),
            api_url: api_url.unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            policy: RetryPolicy::new(MAX_ATTEMPTS, BASE_DELAY),
        }
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    fn request(&self) -> Result<RequestSpec> {
        let feed_url = format!("https://medium.com/feed/@{}", self.username);
        let mut url = Url::parse(&self.api_url)
            .and_then(|url| url.join("/v1/api.json"))
            .context("Invalid rss2json API URL")?;
        url.query_pairs_mut().append_pair("rss_url", &feed_url);
        Ok(RequestSpec::get(url))
    }
}

#[async_trait]
impl Source for MediumSource {
    fn description(&self) -> &'static str {
        "Medium blog data"
    }

    fn file_name(&self) -> &'static str {
        "blogs.json"
    }

    #[tracing::instrument(skip(self, http))]
    async fn fetch(&self, http: &HttpClient) -> Result<String> {
        info!("Fetching Medium blogs data for {}", self.username);
        http.fetch_text("Fetching Medium blog data", &self.request()?, self.policy)
            .await
    }
}
