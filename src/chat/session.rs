//! Conversation session state machine.
//!
//! Owns the transcript for one chat session and enforces the turn protocol:
//! one request in flight at a time, blank input rejected before it touches
//! the network, and responses that arrive after a clear dropped on the
//! floor instead of resurrecting a conversation the user already discarded.
//!
//! The event methods ([`ChatSession::submit`], [`ChatSession::complete`],
//! [`ChatSession::fail`], [`ChatSession::clear`]) are synchronous so every
//! interleaving is testable without a transport; [`ChatSession::send`] is
//! the async driver that strings them together around a backend call.

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::api::QueryService;
use crate::chat::parser::{extract_sql, ExtractedSql};
use crate::chat::request::RequestPayload;
use crate::chat::types::{Message, Transcript};
use crate::error::{DeskError, Result};
use crate::schema::SchemaRegistry;

/// Lifecycle state of a chat session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    /// Ready to accept a submission.
    #[default]
    Idle,
    /// A request is in flight; further submissions are rejected.
    Sending,
    /// The last turn failed. The next submit or clear returns to `Idle`.
    Error,
}

/// A turn that has been submitted but not yet resolved.
///
/// Carries the outbound payload and the session epoch it was issued under.
/// Resolving consumes the turn, so a response can be applied at most once;
/// a turn issued before a [`ChatSession::clear`] no longer matches the
/// epoch and is dropped silently on resolution.
#[derive(Debug)]
pub struct PendingTurn {
    payload: RequestPayload,
    epoch: u64,
}

impl PendingTurn {
    /// Returns the payload to send to the backend.
    pub fn payload(&self) -> &RequestPayload {
        &self.payload
    }
}

/// The conversation controller for a single session.
///
/// Exclusively owns its [`Transcript`]; all mutation goes through the event
/// methods below.
#[derive(Debug, Default)]
pub struct ChatSession {
    transcript: Transcript,
    state: SessionState,
    last_error: Option<String>,
    /// Bumped on every clear; stale [`PendingTurn`]s fail the epoch check.
    epoch: u64,
}

impl ChatSession {
    /// Creates a new idle session with an empty transcript.
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a turn: validates the input, appends the user message, and
    /// builds the outbound payload.
    ///
    /// Rejects blank (whitespace-only) input and rejects any submission
    /// while another turn is in flight; neither case touches the
    /// transcript. A previous error is cleared by a new submission.
    ///
    /// The returned payload's history includes the just-appended user turn
    /// as its final element. That is the shape the backend was built
    /// against, so it is preserved here.
    pub fn submit(&mut self, text: &str, registry: &SchemaRegistry) -> Result<PendingTurn> {
        if self.state == SessionState::Sending {
            return Err(DeskError::validation(
                "a request is already in flight; wait for it to finish",
            ));
        }

        if text.trim().is_empty() {
            return Err(DeskError::validation("please enter a request"));
        }

        self.last_error = None;
        self.transcript.push_user(text);
        let payload = RequestPayload::build(text, &self.transcript, registry);
        self.state = SessionState::Sending;

        debug!(
            history_len = payload.history.len(),
            schema = %payload.schema,
            "Submitted turn"
        );

        Ok(PendingTurn {
            payload,
            epoch: self.epoch,
        })
    }

    /// Resolves a turn with a successful backend reply.
    ///
    /// Appends the assistant message and returns to `Idle`. A stale turn
    /// (the session was cleared while the request was in flight) is dropped
    /// without touching the transcript.
    pub fn complete(&mut self, turn: PendingTurn, content: impl Into<String>) {
        if turn.epoch != self.epoch {
            debug!("Dropping response for a cleared conversation");
            return;
        }

        self.transcript.push_assistant(content);
        self.state = SessionState::Idle;
    }

    /// Resolves a turn with a failure.
    ///
    /// No assistant message is appended; the user's own turn stays in the
    /// transcript so a retry re-sends it as part of the history. A stale
    /// turn is ignored.
    pub fn fail(&mut self, turn: PendingTurn, message: impl Into<String>) {
        if turn.epoch != self.epoch {
            debug!("Dropping failure for a cleared conversation");
            return;
        }

        self.last_error = Some(message.into());
        self.state = SessionState::Error;
    }

    /// Discards the conversation: empties the transcript, clears any error,
    /// and returns to `Idle`.
    ///
    /// Also invalidates any in-flight turn; its response will be dropped on
    /// arrival rather than appended to the fresh conversation.
    pub fn clear(&mut self) {
        self.transcript.clear();
        self.last_error = None;
        self.state = SessionState::Idle;
        self.epoch += 1;
        info!("Conversation cleared");
    }

    /// Runs one full turn against the backend.
    ///
    /// Any transport failure is converted into the `Error` state and
    /// returned; there is no automatic retry, a retry is a fresh call.
    pub async fn send(
        &mut self,
        service: &dyn QueryService,
        registry: &SchemaRegistry,
        text: &str,
    ) -> Result<ExtractedSql> {
        let turn = self.submit(text, registry)?;

        match service.generate(turn.payload()).await {
            Ok(reply) => {
                let extracted = extract_sql(&reply);
                self.complete(turn, reply);
                Ok(extracted)
            }
            Err(err) => {
                warn!(error = %err, "Turn failed");
                self.fail(turn, err.to_string());
                Err(err)
            }
        }
    }

    /// Like [`ChatSession::send`], but races the backend call against a
    /// cancellation token. Cancellation is handled exactly like a transport
    /// failure: the session enters `Error` and the user turn is retained.
    pub async fn send_with_cancel(
        &mut self,
        service: &dyn QueryService,
        registry: &SchemaRegistry,
        text: &str,
        cancel: &CancellationToken,
    ) -> Result<ExtractedSql> {
        let turn = self.submit(text, registry)?;

        let result = tokio::select! {
            result = service.generate(turn.payload()) => result,
            _ = cancel.cancelled() => Err(DeskError::transport("request cancelled")),
        };

        match result {
            Ok(reply) => {
                let extracted = extract_sql(&reply);
                self.complete(turn, reply);
                Ok(extracted)
            }
            Err(err) => {
                warn!(error = %err, "Turn failed");
                self.fail(turn, err.to_string());
                Err(err)
            }
        }
    }

    /// Returns the full transcript in insertion order.
    pub fn messages(&self) -> &[Message] {
        self.transcript.messages()
    }

    /// Returns the content of the trailing assistant message, if the most
    /// recent turn has been answered.
    pub fn last_assistant(&self) -> Option<&str> {
        self.transcript.last_assistant()
    }

    /// Extracts the SQL (and explanation) from the latest assistant reply.
    pub fn last_response(&self) -> Option<ExtractedSql> {
        self.transcript.last_assistant().map(extract_sql)
    }

    /// Returns the clipboard-ready SQL from the latest assistant reply:
    /// the trimmed statement only, no prose, no fences.
    pub fn copy_text(&self) -> Option<String> {
        self.last_response().and_then(|r| r.copy_text())
    }

    /// Returns the current lifecycle state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Returns the user-facing message of the last failure, if the session
    /// is in the `Error` state.
    pub fn error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }
}
