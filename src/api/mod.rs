//! Transport client for the query-generation backend.
//!
//! Provides the trait the conversation core talks through, an HTTP
//! implementation, and a deterministic mock for tests and offline use.

pub mod http;
pub mod mock;

pub use http::{HttpConfig, HttpService};
pub use mock::MockService;

use async_trait::async_trait;

use crate::chat::RequestPayload;
use crate::error::Result;

/// The three backend operations the client consumes, plus a liveness probe.
///
/// Implementations must be thread-safe (Send + Sync) to support async use.
#[async_trait]
pub trait QueryService: Send + Sync {
    /// Sends one conversational turn and returns the assistant's reply
    /// text (free-form prose, usually with an embedded SQL block).
    async fn generate(&self, payload: &RequestPayload) -> Result<String>;

    /// Returns the authoritative list of schema identifiers.
    async fn list_schemas(&self) -> Result<Vec<String>>;

    /// Uploads a schema file and returns the updated identifier list.
    async fn upload_schema(&self, filename: &str, contents: Vec<u8>) -> Result<Vec<String>>;

    /// Probes the backend and returns its status string.
    async fn health(&self) -> Result<String>;
}
