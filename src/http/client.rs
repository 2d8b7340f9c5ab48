//! HTTP client with built-in retry logic and error handling.

use anyhow::Result;
use log::debug;
use reqwest::{Client, Method, StatusCode};

use super::retry::{FetchError, RetryPolicy, with_retry};

/// Immutable description of one outbound request.
///
/// A fresh reqwest request is built from the spec for every attempt, so
/// retries never observe partially consumed state.
#[derive(Debug, Clone)]
pub struct RequestSpec {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(&'static str, String)>,
    pub body: Option<String>,
    /// Status codes treated as success. Defaults to 200 only; a provider
    /// may add a soft status whose response body is still usable.
    pub ok_statuses: Vec<StatusCode>,
}

impl RequestSpec {
    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::GET, url)
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self::new(Method::POST, url)
    }

    fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Vec::new(),
            body: None,
            ok_statuses: vec![StatusCode::OK],
        }
    }

    pub fn header(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.headers.push((name, value.into()));
        self
    }

    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn allow_status(mut self, status: StatusCode) -> Self {
        self.ok_statuses.push(status);
        self
    }

    pub fn is_ok_status(&self, status: StatusCode) -> bool {
        self.ok_statuses.contains(&status)
    }
}

/// HTTP client with built-in retry logic for network operations.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Creates a new HTTP client wrapping the given reqwest Client.
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Issues the described request, retrying per the policy, and resolves
    /// with the full buffered response body.
    ///
    /// Any status outside the spec's accepted set and any transport-level
    /// error counts as a retryable failure; the body is only read once an
    /// accepted status has been seen.
    #[tracing::instrument(skip(self, spec), fields(url = %spec.url))]
    pub async fn fetch_text(&self, operation_name: &str, spec: &RequestSpec, policy: RetryPolicy) -> Result<String> {
        debug!("{} {} ...", spec.method, spec.url);

        with_retry(operation_name, policy, || async {
            let mut request = self.client.request(spec.method.clone(), &spec.url);
            for (name, value) in &spec.headers {
                request = request.header(*name, value);
            }
            if let Some(body) = &spec.body {
                request = request.body(body.clone());
            }

            let response = request.send().await.map_err(FetchError::Transport)?;

            let status = response.status();
            debug!("{}: status code {}", operation_name, status.as_u16());
            if !spec.is_ok_status(status) {
                return Err(FetchError::Status(status));
            }

            // Buffers the whole body; the importer wants one complete
            // value, not a chunk stream.
            response.text().await.map_err(FetchError::Transport)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn fast_policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy::new(max_attempts, Duration::from_millis(10))
    }

    #[tokio::test]
    async fn test_fetch_text_returns_body_verbatim() {
        let mut server = mockito::Server::new_async().await;
        let body = r#"{"data":{"user":{"name":"Test"}}}"#;

        let mock = server
            .mock("GET", "/feed")
            .with_status(200)
            .with_body(body)
            .create_async()
            .await;

        let client = HttpClient::new(Client::new());
        let spec = RequestSpec::get(format!("{}/feed", server.url()));
        let result = client.fetch_text("fetch", &spec, fast_policy(3)).await.unwrap();

        mock.assert_async().await;
        assert_eq!(result, body);
    }

    #[tokio::test]
    async fn test_fetch_text_sends_headers_and_body() {
        let mut server = mockito::Server::new_async().await;

        let mock = server
            .mock("POST", "/graphql")
            .match_header("authorization", "Bearer secret")
            .match_header("content-type", "application/json")
            .match_body(r#"{"query":"{}"}"#)
            .with_status(200)
            .with_body("ok")
            .create_async()
            .await;

        let client = HttpClient::new(Client::new());
        let spec = RequestSpec::post(format!("{}/graphql", server.url()))
            .header("Authorization", "Bearer secret")
            .header("Content-Type", "application/json")
            .body(r#"{"query":"{}"}"#);
        let result = client.fetch_text("fetch", &spec, fast_policy(3)).await.unwrap();

        mock.assert_async().await;
        assert_eq!(result, "ok");
    }

    #[tokio::test]
    async fn test_fetch_text_persistent_500_exhausts_attempts() {
        let mut server = mockito::Server::new_async().await;

        let mock = server
            .mock("GET", "/feed")
            .with_status(500)
            .expect(3)
            .create_async()
            .await;

        let client = HttpClient::new(Client::new());
        let spec = RequestSpec::get(format!("{}/feed", server.url()));
        let err = client
            .fetch_text("fetch", &spec, fast_policy(3))
            .await
            .unwrap_err();

        mock.assert_async().await;
        let message = format!("{:#}", err);
        assert!(message.contains("after 3 attempts"));
        assert!(message.contains("500"));
    }

    #[tokio::test]
    async fn test_fetch_text_soft_status_is_accepted() {
        let mut server = mockito::Server::new_async().await;
        let body = r#"{"data":null,"errors":[{"message":"partial"}]}"#;

        let mock = server
            .mock("POST", "/graphql")
            .with_status(422)
            .with_body(body)
            .expect(1)
            .create_async()
            .await;

        let client = HttpClient::new(Client::new());
        let spec = RequestSpec::post(format!("{}/graphql", server.url()))
            .allow_status(StatusCode::UNPROCESSABLE_ENTITY);
        let result = client.fetch_text("fetch", &spec, fast_policy(3)).await.unwrap();

        mock.assert_async().await;
        assert_eq!(result, body);
    }

    #[tokio::test]
    async fn test_fetch_text_422_retries_without_allowance() {
        let mut server = mockito::Server::new_async().await;

        let mock = server
            .mock("GET", "/feed")
            .with_status(422)
            .expect(2)
            .create_async()
            .await;

        let client = HttpClient::new(Client::new());
        let spec = RequestSpec::get(format!("{}/feed", server.url()));
        let err = client
            .fetch_text("fetch", &spec, fast_policy(2))
            .await
            .unwrap_err();

        mock.assert_async().await;
        assert!(format!("{:#}", err).contains("422"));
    }

    #[tokio::test]
    async fn test_fetch_text_transport_error_is_retried() {
        // Nothing listens on this port; every attempt fails at connect.
        let client = HttpClient::new(Client::new());
        let spec = RequestSpec::get("http://127.0.0.1:9/feed");
        let err = client
            .fetch_text("fetch", &spec, fast_policy(2))
            .await
            .unwrap_err();

        assert!(format!("{:#}", err).contains("after 2 attempts"));
    }
}
