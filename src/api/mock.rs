//! Mock backend for testing.
//!
//! Provides deterministic responses based on input patterns, an in-memory
//! schema store, and a capture log of generation payloads so tests can
//! assert on exactly what would have gone over the wire.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::api::QueryService;
use crate::chat::RequestPayload;
use crate::error::{DeskError, Result};

/// Mock backend that returns canned replies based on input patterns.
///
/// Used for unit and integration testing without a running backend, and by
/// the `--mock` CLI flag for offline experimentation.
#[derive(Debug, Default)]
pub struct MockService {
    /// Custom response mappings (pattern -> reply).
    custom_responses: Vec<(String, String)>,
    /// In-memory schema identifier store.
    schemas: Mutex<Vec<String>>,
    /// Every generation payload received, in order.
    captured: Mutex<Vec<RequestPayload>>,
    /// When set, every operation fails with a transport error.
    fail_all: bool,
    /// Artificial latency before a generation reply resolves.
    delay: Option<std::time::Duration>,
}

impl MockService {
    /// Creates a new mock with the default canned replies.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a mock whose every operation fails with a transport error.
    pub fn failing() -> Self {
        Self {
            fail_all: true,
            ..Self::default()
        }
    }

    /// Adds a custom reply mapping.
    ///
    /// When the user message contains `pattern` (case-insensitive), the
    /// mock replies with `response`.
    pub fn with_response(mut self, pattern: impl Into<String>, response: impl Into<String>) -> Self {
        self.custom_responses.push((pattern.into(), response.into()));
        self
    }

    /// Seeds the mock's schema store.
    pub fn with_schemas<I, S>(self, schemas: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        *self.schemas.lock().expect("mock schema store poisoned") =
            schemas.into_iter().map(Into::into).collect();
        self
    }

    /// Delays generation replies, to simulate a slow backend.
    pub fn with_delay(mut self, delay: std::time::Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Returns every generation payload received so far.
    pub fn requests(&self) -> Vec<RequestPayload> {
        self.captured.lock().expect("mock capture log poisoned").clone()
    }

    fn unavailable() -> DeskError {
        DeskError::transport("mock backend unavailable")
    }

    /// Generates a canned reply based on the user message.
    fn mock_response(&self, input: &str) -> String {
        let input_lower = input.to_lowercase();

        // Check custom responses first
        for (pattern, response) in &self.custom_responses {
            if input_lower.contains(&pattern.to_lowercase()) {
                return response.clone();
            }
        }

        // Default pattern matching
        if input_lower.contains("all users") || input_lower.contains("show users") {
            return "Here is the query:\n```sql\nSELECT * FROM users;\n```".to_string();
        }

        if input_lower.contains("count") && input_lower.contains("orders") {
            return "```sql\nSELECT COUNT(*) FROM orders;\n```".to_string();
        }

        if input_lower.contains("last week") {
            return "Assuming a `created_at` column:\n```sql\nSELECT * FROM users WHERE created_at >= now() - interval '7 days';\n```".to_string();
        }

        "I don't understand that question. Could you please rephrase it?".to_string()
    }
}

#[async_trait]
impl QueryService for MockService {
    async fn generate(&self, payload: &RequestPayload) -> Result<String> {
        if self.fail_all {
            return Err(Self::unavailable());
        }

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        self.captured
            .lock()
            .expect("mock capture log poisoned")
            .push(payload.clone());

        Ok(self.mock_response(&payload.message))
    }

    async fn list_schemas(&self) -> Result<Vec<String>> {
        if self.fail_all {
            return Err(Self::unavailable());
        }

        Ok(self.schemas.lock().expect("mock schema store poisoned").clone())
    }

    async fn upload_schema(&self, filename: &str, _contents: Vec<u8>) -> Result<Vec<String>> {
        if self.fail_all {
            return Err(Self::unavailable());
        }

        let mut schemas = self.schemas.lock().expect("mock schema store poisoned");
        if !schemas.iter().any(|s| s == filename) {
            schemas.push(filename.to_string());
        }
        Ok(schemas.clone())
    }

    async fn health(&self) -> Result<String> {
        if self.fail_all {
            return Err(Self::unavailable());
        }

        Ok("healthy".to_string())
    }
}
