//! Message types for the conversation core.
//!
//! Defines the roles, messages, and the append-only transcript that backs a
//! chat session.

use serde::{Deserialize, Serialize};

/// Role of a message in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// User message (human input).
    User,
    /// Assistant message (backend response).
    Assistant,
    /// System message. Reserved: this client never appends one, and the
    /// outbound history filter excludes the role entirely.
    System,
}

impl Role {
    /// Returns the role as a string for API requests.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
            Self::System => "system",
        }
    }
}

/// A single message in a conversation. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// The role of the message sender.
    pub role: Role,
    /// The content of the message. Assistant content may carry a fenced
    /// SQL block; see [`crate::chat::parser`].
    pub content: String,
}

impl Message {
    /// Creates a new message with the given role and content.
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    /// Creates a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    /// Creates an assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

/// An append-only, ordered log of conversation turns.
///
/// Entries are never edited, reordered, or individually removed; the only
/// destructive operation is [`Transcript::clear`], which empties the whole
/// log. Content validation (e.g. rejecting blank user input) happens in the
/// session layer before anything is pushed here.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    /// Creates a new empty transcript.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a message to the end of the transcript.
    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Appends a user message.
    pub fn push_user(&mut self, content: impl Into<String>) {
        self.push(Message::user(content));
    }

    /// Appends an assistant message.
    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.push(Message::assistant(content));
    }

    /// Returns all messages in insertion order.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Returns the messages to send as conversation history, in order.
    ///
    /// Excludes any `system` entries. The backend composes its own system
    /// prompt, so a system message leaking into the history would be
    /// duplicated context at best; the filter is part of the wire contract,
    /// not an optimization.
    pub fn history_for_request(&self) -> Vec<Message> {
        self.messages
            .iter()
            .filter(|m| m.role != Role::System)
            .cloned()
            .collect()
    }

    /// Returns the content of the trailing assistant message.
    ///
    /// `None` when the transcript is empty or when the most recent entry is
    /// not from the assistant (e.g. a user turn is awaiting its response).
    pub fn last_assistant(&self) -> Option<&str> {
        match self.messages.last() {
            Some(m) if m.role == Role::Assistant => Some(&m.content),
            _ => None,
        }
    }

    /// Removes every message from the transcript.
    pub fn clear(&mut self) {
        self.messages.clear();
    }

    /// Returns the number of messages in the transcript.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Returns true if the transcript has no messages.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
