//! Schema registry client.
//!
//! Tracks the schema identifiers known to the backend and the one currently
//! selected as context for generated queries. The backend owns the schema
//! contents; this side only ever sees the identifiers.

use tracing::{debug, warn};

use crate::api::QueryService;
use crate::error::{DeskError, Result};

/// Known schema identifiers plus the current selection.
///
/// `selected`, when set, is always a member of the known set. A refresh or
/// upload that drops the selected identifier from the backend's list resets
/// the selection rather than leaving it dangling.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    known: Vec<String>,
    selected: Option<String>,
}

impl SchemaRegistry {
    /// Creates an empty registry with no selection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the known set wholesale, dropping a selection that is no
    /// longer listed.
    pub(crate) fn replace_known(&mut self, schemas: Vec<String>) {
        self.known = schemas;
        if let Some(selected) = &self.selected {
            if !self.known.iter().any(|k| k == selected) {
                warn!(schema = %selected, "Selected schema no longer listed; clearing selection");
                self.selected = None;
            }
        }
    }

    /// Fetches the authoritative schema list from the backend.
    ///
    /// On failure the previous known set (and selection) are left untouched;
    /// the error is surfaced so the caller can tell the user and retry.
    pub async fn refresh(&mut self, service: &dyn QueryService) -> Result<()> {
        let schemas = service.list_schemas().await?;
        debug!(count = schemas.len(), "Refreshed schema list");
        self.replace_known(schemas);
        Ok(())
    }

    /// Uploads a schema file and adopts the server-returned list.
    ///
    /// The backend only stores `.txt` files; anything else is rejected here
    /// before the round-trip. On transport failure the known set is
    /// unchanged.
    pub async fn upload(
        &mut self,
        service: &dyn QueryService,
        filename: &str,
        contents: Vec<u8>,
    ) -> Result<()> {
        if !filename.ends_with(".txt") {
            return Err(DeskError::validation(format!(
                "unsupported schema file '{filename}': only .txt files are accepted"
            )));
        }

        let schemas = service.upload_schema(filename, contents).await?;
        debug!(schema = %filename, count = schemas.len(), "Uploaded schema");
        self.replace_known(schemas);
        Ok(())
    }

    /// Sets the selected schema, or clears it with `None`.
    ///
    /// Selecting an identifier that is not in the known set is a caller
    /// error and fails fast.
    pub fn select(&mut self, identifier: Option<&str>) -> Result<()> {
        match identifier {
            None => {
                self.selected = None;
                Ok(())
            }
            Some(id) if self.known.iter().any(|k| k == id) => {
                self.selected = Some(id.to_string());
                Ok(())
            }
            Some(id) => Err(DeskError::validation(format!(
                "unknown schema '{id}'; refresh the list or upload it first"
            ))),
        }
    }

    /// Returns the known schema identifiers in the backend's listing order.
    pub fn known(&self) -> &[String] {
        &self.known
    }

    /// Returns the selected schema identifier, if any.
    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// Returns the selected schema identifier, or `""` when none is set.
    ///
    /// This is the form the wire contract expects.
    pub fn selected_or_empty(&self) -> &str {
        self.selected.as_deref().unwrap_or("")
    }
}
