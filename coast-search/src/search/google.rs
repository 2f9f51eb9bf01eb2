//! Google Custom Search JSON API client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};

use super::protocols::{SearchClient, SearchRequest};
use crate::config::{RetryConfig, RunConfig};
use crate::errors::{CoastError, Result};
use crate::results::ApiResponse;

/// Default endpoint of the Custom Search JSON API.
pub const DEFAULT_ENDPOINT: &str = "https://www.googleapis.com/customsearch/v1";

/// [`SearchClient`] backed by the Custom Search JSON API.
#[derive(Debug, Clone)]
pub struct GoogleSearchClient {
    client: Client,
    endpoint: String,
    retry: RetryConfig,
}

impl GoogleSearchClient {
    /// Creates a client with the given retry policy and request timeout.
    pub fn new(retry: RetryConfig, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("coast-search/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| CoastError::Search(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            retry,
        })
    }

    /// Creates a client using the config's retry policy.
    pub fn from_config(config: &RunConfig, timeout: Duration) -> Result<Self> {
        Self::new(config.retry.clone(), timeout)
    }

    /// Points the client at a different endpoint.
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Endpoint requests are sent to.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Retry policy applied to failed requests.
    #[must_use]
    pub fn retry(&self) -> &RetryConfig {
        &self.retry
    }

    async fn send_once(&self, request: &SearchRequest) -> Attempt {
        let start = request.start.to_string();
        let sent = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("key", request.api_key.as_str()),
                ("cx", request.search_engine_id.as_str()),
                ("q", request.query.as_str()),
                ("start", start.as_str()),
            ])
            .send()
            .await;

        let response = match sent {
            Ok(response) => response,
            Err(e) if e.is_timeout() || e.is_connect() => {
                return Attempt::Retryable(format!("request failed: {e}"));
            }
            Err(e) => return Attempt::Fatal(CoastError::Search(format!("request failed: {e}"))),
        };

        let status = response.status();
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                return Attempt::Fatal(CoastError::Search(format!(
                    "failed to read response body: {e}"
                )))
            }
        };

        if status == StatusCode::OK {
            return match serde_json::from_str::<serde_json::Value>(&body) {
                Ok(value) => match ApiResponse::from_value(value) {
                    Ok(parsed) => Attempt::Done(parsed),
                    Err(e) => Attempt::Fatal(e.into()),
                },
                Err(e) => Attempt::Fatal(CoastError::Search(format!(
                    "failed to parse response: {e}"
                ))),
            };
        }

        let message = format!("search API error (status {status}): {body}");
        if self.retry.should_retry_status(status.as_u16()) {
            Attempt::Retryable(message)
        } else {
            Attempt::Fatal(CoastError::Search(message))
        }
    }
}

enum Attempt {
    Done(ApiResponse),
    Retryable(String),
    Fatal(CoastError),
}

#[async_trait]
impl SearchClient for GoogleSearchClient {
    async fn search(&self, request: &SearchRequest) -> Result<ApiResponse> {
        let mut attempt = 0;
        loop {
            match self.send_once(request).await {
                Attempt::Done(response) => return Ok(response),
                Attempt::Fatal(error) => return Err(error),
                Attempt::Retryable(message) if attempt < self.retry.max_retries => {
                    let delay = self.retry.delay_for_attempt(attempt);
                    tracing::warn!(
                        segment_id = request.segment_id,
                        start = request.start,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %message,
                        "Retrying search request"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Attempt::Retryable(message) => return Err(CoastError::Search(message)),
            }
        }
    }
}
