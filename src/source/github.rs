//! GitHub profile data via the GraphQL API.

use anyhow::{Context, Result};
use async_trait::async_trait;
use log::info;
use reqwest::StatusCode;
use serde::Serialize;

use super::Source;
use crate::config::GithubConfig;
use crate::http::{HttpClient, RequestSpec, RetryPolicy};

pub const DEFAULT_API_URL: &str = "https://api.github.com";

#[derive(Serialize)]
struct GraphqlRequest {
    query: String,
}

/// Fetches the user's profile and pinned repositories as one GraphQL
/// document, written verbatim to `profile.json`.
pub struct GithubSource {
    username: String,
    token: String,
    api_url: String,
    policy: RetryPolicy,
}

impl GithubSource {
    pub fn new(config: &GithubConfig, api_url: Option<String>) -> Self {
        Self {
            username: config.username.clone(),
            token: config.token.clone(),
            api_url: api_url.unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            policy: RetryPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    fn request(&self) -> Result<RequestSpec> {
        let body = serde_json::to_string(&GraphqlRequest {
            query: pinned_items_query(&self.username),
        })
        .context("Failed to serialize GraphQL request")?;

        // 422 responses still carry a usable GraphQL document (partial
        // data plus an errors array), so they are accepted, not retried.
        Ok(RequestSpec::post(format!("{}/graphql", self.api_url))
            .header("Authorization", format!("Bearer {}", self.token))
            .header("User-Agent", "folio-fetch")
            .header("Content-Type", "application/json")
            .body(body)
            .allow_status(StatusCode::UNPROCESSABLE_ENTITY))
    }
}

#[async_trait]
impl Source for GithubSource {
    fn description(&self) -> &'static str {
        "GitHub profile data"
    }

    fn file_name(&self) -> &'static str {
        "profile.json"
    }

    #[tracing::instrument(skip(self, http))]
    async fn fetch(&self, http: &HttpClient) -> Result<String> {
        info!("Fetching GitHub profile data for {}", self.username);
        http.fetch_text("Fetching GitHub profile data", &self.request()?, self.policy)
            .await
    }
}

fn pinned_items_query(username: &str) -> String {
    format!(
        r#"
{{
  user(login:"{username}") {{
    name
    bio
    avatarUrl
    location
    pinnedItems(first: 6, types: [REPOSITORY]) {{
      totalCount
      edges {{
          node {{
            ... on Repository {{
              name
              description
              forkCount
              stargazers {{
                totalCount
              }}
              url
              id
              diskUsage
              primaryLanguage {{
                name
                color
              }}
            }}
          }}
        }}
      }}
    }}
}}
"#
    )
}
