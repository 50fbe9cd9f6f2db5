//! Outbound request assembly.
//!
//! Builds the payload sent to the query-generation backend for one
//! conversational turn.

use serde::Serialize;

use crate::chat::types::{Message, Transcript};
use crate::schema::SchemaRegistry;

/// The payload for one `generate-query` call.
///
/// Serializes directly to the backend's wire format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequestPayload {
    /// The new user utterance, verbatim.
    pub message: String,
    /// Conversation history, oldest first, `system` entries excluded.
    pub history: Vec<Message>,
    /// The selected schema identifier, or an empty string for "no schema
    /// context".
    pub schema: String,
}

impl RequestPayload {
    /// Builds the payload for a turn.
    ///
    /// Call this *after* the user message has been appended: the backend
    /// expects the history to carry the current user turn as its final
    /// element, and the session relies on that shape when a failed turn is
    /// retried.
    pub fn build(message: impl Into<String>, transcript: &Transcript, registry: &SchemaRegistry) -> Self {
        Self {
            message: message.into(),
            history: transcript.history_for_request(),
            schema: registry.selected_or_empty().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::types::Role;

    #[test]
    fn test_build_includes_current_turn() {
        let mut transcript = Transcript::new();
        transcript.push_user("show me all users");
        let registry = SchemaRegistry::new();

        let payload = RequestPayload::build("show me all users", &transcript, &registry);

        assert_eq!(payload.message, "show me all users");
        assert_eq!(payload.history.len(), 1);
        assert_eq!(payload.history[0].role, Role::User);
        assert_eq!(payload.history[0].content, "show me all users");
    }

    #[test]
    fn test_build_without_schema_sends_empty_string() {
        let transcript = Transcript::new();
        let registry = SchemaRegistry::new();

        let payload = RequestPayload::build("hello", &transcript, &registry);

        assert_eq!(payload.schema, "");
    }

    #[test]
    fn test_build_with_selected_schema() {
        let transcript = Transcript::new();
        let mut registry = SchemaRegistry::new();
        registry.replace_known(vec!["loans.txt".to_string()]);
        registry.select(Some("loans.txt")).unwrap();

        let payload = RequestPayload::build("hello", &transcript, &registry);

        assert_eq!(payload.schema, "loans.txt");
    }

    #[test]
    fn test_message_kept_verbatim() {
        let transcript = Transcript::new();
        let registry = SchemaRegistry::new();

        let payload = RequestPayload::build("  padded input \n", &transcript, &registry);

        assert_eq!(payload.message, "  padded input \n");
    }

    #[test]
    fn test_wire_format() {
        let mut transcript = Transcript::new();
        transcript.push_user("count the orders");
        let registry = SchemaRegistry::new();

        let payload = RequestPayload::build("count the orders", &transcript, &registry);
        let json = serde_json::to_value(&payload).unwrap();

        assert_eq!(json["message"], "count the orders");
        assert_eq!(json["schema"], "");
        assert_eq!(json["history"][0]["role"], "user");
        assert_eq!(json["history"][0]["content"], "count the orders");
    }
}
