//! HTTP implementation of the backend client.
//!
//! Speaks the backend's JSON wire contract over reqwest. Generation
//! requests are retried with exponential backoff on transient failures;
//! schema operations surface failures immediately.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};
use url::Url;

use crate::api::QueryService;
use crate::chat::RequestPayload;
use crate::error::{DeskError, Result};

/// Default timeout for backend requests.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Maximum number of attempts for a generation request.
const MAX_RETRY_ATTEMPTS: u32 = 3;

/// Base delay for exponential backoff (milliseconds).
const RETRY_BASE_DELAY_MS: u64 = 1000;

/// HTTP client configuration.
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Backend base URL (e.g. "http://localhost:5000").
    pub base_url: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl HttpConfig {
    /// Creates a new config for the given base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Validates the base URL.
    fn validate(&self) -> Result<()> {
        let url = Url::parse(&self.base_url)
            .map_err(|e| DeskError::config(format!("invalid base URL '{}': {e}", self.base_url)))?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(DeskError::config(format!(
                "Invalid scheme '{}'. Expected 'http' or 'https'",
                url.scheme()
            )));
        }

        Ok(())
    }
}

/// HTTP backend client.
#[derive(Debug, Clone)]
pub struct HttpService {
    config: HttpConfig,
    client: Client,
}

impl HttpService {
    /// Creates a new client with the given configuration.
    pub fn new(config: HttpConfig) -> Result<Self> {
        config.validate()?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| DeskError::transport(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { config, client })
    }

    /// Returns the full URL for a backend endpoint path.
    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), path)
    }

    /// Parses an error response body and returns (error, is_retryable).
    fn parse_error(status: reqwest::StatusCode, body: &str) -> (DeskError, bool) {
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return (
                DeskError::transport("Rate limited. Please wait and try again."),
                true,
            );
        }

        // 5xx errors are generally transient
        let is_retryable = status.is_server_error();

        // The backend reports failures as {"error": "..."} (sometimes with
        // an accompanying "success": false)
        if let Ok(error_response) = serde_json::from_str::<ErrorResponse>(body) {
            if let Some(message) = error_response.error {
                return (
                    DeskError::transport(format!("Backend error: {message}")),
                    is_retryable,
                );
            }
        }

        (
            DeskError::transport(format!("Backend error ({status}): {body}")),
            is_retryable,
        )
    }

    /// Determines if a request error is retryable.
    fn is_retryable_request_error(error: &reqwest::Error) -> bool {
        error.is_timeout() || error.is_connect()
    }

    /// Converts a reqwest error into a user-facing transport error.
    fn request_error(error: reqwest::Error) -> DeskError {
        if error.is_timeout() {
            DeskError::transport("Request timed out. Try again.")
        } else if error.is_connect() {
            DeskError::transport("Failed to connect to the backend. Is it running?")
        } else {
            DeskError::transport(format!("Request failed: {error}"))
        }
    }

    /// Reads a successful response body into the given type.
    async fn read_json<T: for<'de> Deserialize<'de>>(response: reqwest::Response) -> Result<T> {
        let body = response
            .text()
            .await
            .map_err(|e| DeskError::transport(format!("Failed to read response: {e}")))?;

        serde_json::from_str(&body)
            .map_err(|e| DeskError::transport(format!("Failed to parse response: {e}")))
    }
}

#[async_trait]
impl QueryService for HttpService {
    async fn generate(&self, payload: &RequestPayload) -> Result<String> {
        let url = self.endpoint("generate-query");

        let mut last_error = None;
        let mut delay = Duration::from_millis(RETRY_BASE_DELAY_MS);

        for attempt in 1..=MAX_RETRY_ATTEMPTS {
            debug!(
                attempt,
                max = MAX_RETRY_ATTEMPTS,
                history_len = payload.history.len(),
                "Sending generation request"
            );

            let result = self.client.post(&url).json(payload).send().await;

            match result {
                Ok(response) => {
                    let status = response.status();

                    if status.is_success() {
                        let parsed: GenerateResponse = Self::read_json(response).await?;
                        return Ok(parsed.response);
                    }

                    let body = response.text().await.unwrap_or_default();
                    let (error, is_retryable) = Self::parse_error(status, &body);
                    last_error = Some(error);

                    if !is_retryable || attempt >= MAX_RETRY_ATTEMPTS {
                        break;
                    }

                    warn!(
                        attempt,
                        status = %status,
                        "Generation request failed, retrying in {:?}",
                        delay
                    );
                }
                Err(e) => {
                    let is_retryable = Self::is_retryable_request_error(&e);
                    last_error = Some(Self::request_error(e));

                    if !is_retryable || attempt >= MAX_RETRY_ATTEMPTS {
                        break;
                    }

                    warn!(attempt, "Generation request failed, retrying in {:?}", delay);
                }
            }

            tokio::time::sleep(delay).await;
            delay *= 2; // Exponential backoff
        }

        Err(last_error
            .unwrap_or_else(|| DeskError::internal("generation retry loop exited without error")))
    }

    async fn list_schemas(&self) -> Result<Vec<String>> {
        let response = self
            .client
            .get(self.endpoint("get-schemas"))
            .send()
            .await
            .map_err(Self::request_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let (error, _) = Self::parse_error(status, &body);
            return Err(error);
        }

        let parsed: ListSchemasResponse = Self::read_json(response).await?;
        debug!(count = parsed.count, "Fetched schema list");
        Ok(parsed.schemas)
    }

    async fn upload_schema(&self, filename: &str, contents: Vec<u8>) -> Result<Vec<String>> {
        let part = Part::bytes(contents).file_name(filename.to_string());
        let form = Form::new().part("file", part);

        let response = self
            .client
            .post(self.endpoint("upload-schema"))
            .multipart(form)
            .send()
            .await
            .map_err(Self::request_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let (error, _) = Self::parse_error(status, &body);
            return Err(error);
        }

        let parsed: UploadResponse = Self::read_json(response).await?;
        debug!(message = %parsed.message, "Schema upload accepted");
        Ok(parsed.schemas)
    }

    async fn health(&self) -> Result<String> {
        let response = self
            .client
            .get(self.endpoint("health"))
            .send()
            .await
            .map_err(Self::request_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let (error, _) = Self::parse_error(status, &body);
            return Err(error);
        }

        let parsed: HealthResponse = Self::read_json(response).await?;
        debug!(message = %parsed.message, "Backend health check passed");
        Ok(parsed.status)
    }
}

// Backend wire types

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
}

#[derive(Debug, Deserialize)]
struct ListSchemasResponse {
    schemas: Vec<String>,
    #[serde(default)]
    count: usize,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    #[serde(default)]
    message: String,
    schemas: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct HealthResponse {
    status: String,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: Option<String>,
}
