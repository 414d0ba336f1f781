use crate::error::ValidatorError;
use reqwest::{Client, RequestBuilder, Response};
use std::time::Duration;
use tokio::time::{sleep, timeout};
use tracing::debug;

/// Configuration for the HTTP client
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Request timeout in seconds
    pub timeout_seconds: u64,
    /// Number of retry attempts
    pub retry_attempts: u32,
    /// Initial retry delay in milliseconds
    pub retry_delay_ms: u64,
    /// Maximum retry delay in milliseconds (for exponential backoff cap)
    pub max_retry_delay_ms: u64,
    /// User agent string
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 30,
            retry_attempts: 3,
            retry_delay_ms: 1000,
            max_retry_delay_ms: 30000,
            user_agent: format!("newsml-validator/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Async HTTP client for the HTML checker service and remote schemas
#[derive(Clone)]
pub struct AsyncHttpClient {
    client: Client,
    config: HttpClientConfig,
}

impl AsyncHttpClient {
    /// Create a new async HTTP client with the given configuration
    pub fn new(config: HttpClientConfig) -> Result<Self, ValidatorError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(&config.user_agent)
            .pool_idle_timeout(Duration::from_secs(30))
            .pool_max_idle_per_host(10)
            .build()
            .map_err(ValidatorError::from)?;

        Ok(Self { client, config })
    }

    /// Download a resource with retry logic and exponential backoff
    pub async fn download(&self, url: &str) -> Result<Vec<u8>, ValidatorError> {
        let response = self.send_with_retry(url, || self.client.get(url)).await?;
        let bytes = response.bytes().await.map_err(ValidatorError::from)?;
        Ok(bytes.to_vec())
    }

    /// POST a document body and return the response body
    pub async fn post_document(
        &self,
        url: &str,
        body: &str,
        content_type: &str,
    ) -> Result<Vec<u8>, ValidatorError> {
        let response = self
            .send_with_retry(url, || {
                self.client
                    .post(url)
                    .header(reqwest::header::CONTENT_TYPE, content_type)
                    .body(body.to_string())
            })
            .await?;
        let bytes = response.bytes().await.map_err(ValidatorError::from)?;
        Ok(bytes.to_vec())
    }

    /// Send a request, retrying server errors and transient failures
    async fn send_with_retry<F>(&self, url: &str, build: F) -> Result<Response, ValidatorError>
    where
        F: Fn() -> RequestBuilder,
    {
        let mut current_attempt = 0;

        loop {
            match self.make_request(url, build()).await {
                Ok(response) => {
                    if response.status().is_success() {
                        return Ok(response);
                    }

                    let status = response.status();
                    let error = ValidatorError::HttpStatus {
                        url: url.to_string(),
                        status: status.as_u16(),
                        message: format!(
                            "HTTP {}: {}",
                            status.as_u16(),
                            status.canonical_reason().unwrap_or("Unknown")
                        ),
                    };

                    // Retry on server errors (5xx) but not client errors (4xx)
                    if status.is_server_error() && current_attempt < self.config.retry_attempts {
                        debug!(url, status = status.as_u16(), attempt = current_attempt, "retrying");
                        self.wait_before_retry(current_attempt).await;
                        current_attempt += 1;
                        continue;
                    }

                    return Err(error);
                }
                Err(error) => {
                    if current_attempt < self.config.retry_attempts && self.is_retryable_error(&error)
                    {
                        debug!(url, error = %error, attempt = current_attempt, "retrying");
                        self.wait_before_retry(current_attempt).await;
                        current_attempt += 1;
                        continue;
                    }
                    return Err(error);
                }
            }
        }
    }

    /// Make a single HTTP request with timeout
    async fn make_request(
        &self,
        url: &str,
        request: RequestBuilder,
    ) -> Result<Response, ValidatorError> {
        timeout(
            Duration::from_secs(self.config.timeout_seconds),
            request.send(),
        )
        .await
        .map_err(|_| ValidatorError::Timeout {
            url: url.to_string(),
            timeout_seconds: self.config.timeout_seconds,
        })?
        .map_err(ValidatorError::from)
    }

    /// Backoff delay for a given attempt
    fn retry_delay(&self, attempt: u32) -> Duration {
        let delay_ms = self
            .config
            .retry_delay_ms
            .saturating_mul(2_u64.saturating_pow(attempt));
        Duration::from_millis(delay_ms.min(self.config.max_retry_delay_ms))
    }

    /// Wait before retry with exponential backoff
    async fn wait_before_retry(&self, attempt: u32) {
        sleep(self.retry_delay(attempt)).await;
    }

    /// Check if an error is retryable
    fn is_retryable_error(&self, error: &ValidatorError) -> bool {
        match error {
            ValidatorError::Http(reqwest_error) => {
                reqwest_error.is_timeout() || reqwest_error.is_connect()
            }
            ValidatorError::Timeout { .. } => true,
            _ => false,
        }
    }

    /// Get the client configuration
    pub fn config(&self) -> &HttpClientConfig {
        &self.config
    }
}
