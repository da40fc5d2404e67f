//! HTTP client implementation using reqwest.

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result},
    http::{HttpClient, HttpMethod, HttpRequest, HttpResponse, RetryPolicy},
};
use reqwest::Client;
use std::collections::HashMap;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

/// Reqwest-based HTTP client.
///
/// Provides connection pooling, TLS by default, and automatic retry with
/// exponential backoff on transient failures (5xx, 429, transport errors).
pub struct ReqwestHttpClient {
    client: Client,
}

impl ReqwestHttpClient {
    /// Create a new client with default configuration.
    pub fn new() -> Self {
        Self::with_timeout(Duration::from_secs(30))
    }

    /// Create a new client with a custom request timeout.
    pub fn with_timeout(timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(10))
            .pool_max_idle_per_host(10)
            .user_agent("mobile-music-core/0.1.0")
            .build()
            .expect("Failed to build HTTP client");

        Self { client }
    }

    /// Wrap an externally configured reqwest client.
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    fn convert_method(method: HttpMethod) -> reqwest::Method {
        match method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Patch => reqwest::Method::PATCH,
            HttpMethod::Delete => reqwest::Method::DELETE,
        }
    }

    fn build_request(&self, request: HttpRequest) -> reqwest::RequestBuilder {
        let method = Self::convert_method(request.method);
        let mut req = self.client.request(method, &request.url);

        for (key, value) in request.headers {
            req = req.header(key, value);
        }

        if let Some(body) = request.body {
            req = req.body(body);
        }

        if let Some(timeout) = request.timeout {
            req = req.timeout(timeout);
        }

        req
    }

    async fn execute_once(&self, request: HttpRequest) -> Result<Outcome> {
        match self.build_request(request).send().await {
            Ok(response) => {
                let status = response.status().as_u16();

                if status >= 500 || status == 429 {
                    return Ok(Outcome::Retryable(BridgeError::OperationFailed(format!(
                        "HTTP {} error",
                        status
                    ))));
                }

                let headers: HashMap<String, String> = response
                    .headers()
                    .iter()
                    .filter_map(|(k, v)| v.to_str().ok().map(|s| (k.to_string(), s.to_string())))
                    .collect();

                let body = response
                    .bytes()
                    .await
                    .map_err(|e| BridgeError::OperationFailed(e.to_string()))?;

                Ok(Outcome::Done(HttpResponse {
                    status,
                    headers,
                    body,
                }))
            }
            Err(e) if e.is_timeout() => Ok(Outcome::Retryable(BridgeError::OperationFailed(
                "Request timed out".to_string(),
            ))),
            Err(e) if e.is_connect() => Ok(Outcome::Retryable(BridgeError::OperationFailed(
                format!("Connection failed: {}", e),
            ))),
            Err(e) => Ok(Outcome::Retryable(BridgeError::OperationFailed(
                e.to_string(),
            ))),
        }
    }
}

enum Outcome {
    Done(HttpResponse),
    Retryable(BridgeError),
}

impl Default for ReqwestHttpClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
        self.execute_with_retry(request, RetryPolicy::default())
            .await
    }

    async fn execute_with_retry(
        &self,
        request: HttpRequest,
        policy: RetryPolicy,
    ) -> Result<HttpResponse> {
        let mut last_error = None;

        for attempt in 1..=policy.max_attempts {
            debug!(
                attempt,
                max_attempts = policy.max_attempts,
                url = %request.url,
                "Executing HTTP request"
            );

            match self.execute_once(request.clone()).await? {
                Outcome::Done(response) => return Ok(response),
                Outcome::Retryable(error) => {
                    warn!(attempt, error = %error, "HTTP request failed");
                    last_error = Some(error);
                }
            }

            if attempt < policy.max_attempts {
                let backoff = policy.base_delay * 2u32.pow(attempt - 1);
                let delay = backoff.min(policy.max_delay);
                debug!(delay_ms = delay.as_millis() as u64, "Retrying after delay");
                sleep(delay).await;
            }
        }

        Err(last_error.unwrap_or_else(|| {
            BridgeError::OperationFailed("All retry attempts exhausted".to_string())
        }))
    }
}
