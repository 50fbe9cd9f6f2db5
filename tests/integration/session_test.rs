//! Conversation round-trip integration tests.
//!
//! Drives full turns through `ChatSession::send` against the mock backend
//! and asserts on the payloads that would have gone over the wire.

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use sql_desk::api::MockService;
use sql_desk::chat::{ChatSession, Role, SessionState};
use sql_desk::schema::SchemaRegistry;

#[tokio::test]
async fn test_round_trip_appends_both_turns() {
    let service = MockService::new();
    let mut session = ChatSession::new();
    let registry = SchemaRegistry::new();

    let extracted = session
        .send(&service, &registry, "show me all users")
        .await
        .unwrap();

    assert_eq!(extracted.copy_text(), Some("SELECT * FROM users;".to_string()));
    assert_eq!(session.state(), SessionState::Idle);

    let messages = session.messages();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].role, Role::User);
    assert_eq!(messages[1].role, Role::Assistant);
}

#[tokio::test]
async fn test_history_sent_includes_current_turn() {
    let service = MockService::new()
        .with_response("A", "```sql X```")
        .with_response("B", "```sql Y```");
    let mut session = ChatSession::new();
    let registry = SchemaRegistry::new();

    session.send(&service, &registry, "A").await.unwrap();
    session.send(&service, &registry, "B").await.unwrap();

    let requests = service.requests();
    assert_eq!(requests.len(), 2);

    // The first request already carries its own user turn.
    assert_eq!(requests[0].history.len(), 1);
    assert_eq!(requests[0].history[0].content, "A");

    // The second request carries the full exchange plus the new turn.
    let history = &requests[1].history;
    assert_eq!(history.len(), 3);
    assert_eq!((history[0].role, history[0].content.as_str()), (Role::User, "A"));
    assert_eq!(
        (history[1].role, history[1].content.as_str()),
        (Role::Assistant, "```sql X```")
    );
    assert_eq!((history[2].role, history[2].content.as_str()), (Role::User, "B"));
}

#[tokio::test]
async fn test_selected_schema_rides_along() {
    let service = MockService::new().with_schemas(vec!["loans.txt"]);
    let mut session = ChatSession::new();
    let mut registry = SchemaRegistry::new();
    registry.refresh(&service).await.unwrap();
    registry.select(Some("loans.txt")).unwrap();

    session
        .send(&service, &registry, "count the orders")
        .await
        .unwrap();

    assert_eq!(service.requests()[0].schema, "loans.txt");
}

#[tokio::test]
async fn test_failed_turn_enters_error_and_keeps_user_message() {
    let service = MockService::failing();
    let mut session = ChatSession::new();
    let registry = SchemaRegistry::new();

    let err = session
        .send(&service, &registry, "show me all users")
        .await
        .unwrap_err();

    assert!(err.is_transport());
    assert_eq!(session.state(), SessionState::Error);
    assert!(session.error().is_some());
    assert_eq!(session.messages().len(), 1);
    assert_eq!(session.messages()[0].role, Role::User);
}

#[tokio::test]
async fn test_retry_after_failure_resends_failed_turn_as_history() {
    let failing = MockService::failing();
    let mut session = ChatSession::new();
    let registry = SchemaRegistry::new();

    session.send(&failing, &registry, "A").await.unwrap_err();

    let service = MockService::new();
    session.send(&service, &registry, "A again").await.unwrap();

    assert_eq!(session.state(), SessionState::Idle);
    let history = &service.requests()[0].history;
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].content, "A");
    assert_eq!(history[1].content, "A again");
}

#[tokio::test]
async fn test_reply_without_sql_still_completes_turn() {
    let service = MockService::new();
    let mut session = ChatSession::new();
    let registry = SchemaRegistry::new();

    let extracted = session
        .send(&service, &registry, "what is the meaning of life?")
        .await
        .unwrap();

    assert_eq!(extracted.sql, None);
    assert!(extracted.explanation.contains("rephrase"));
    assert_eq!(session.copy_text(), None);
    assert_eq!(session.messages().len(), 2);
}

#[tokio::test]
async fn test_cancellation_is_treated_as_failure() {
    let service = MockService::new().with_delay(Duration::from_secs(30));
    let mut session = ChatSession::new();
    let registry = SchemaRegistry::new();

    let cancel = CancellationToken::new();
    cancel.cancel();

    let err = session
        .send_with_cancel(&service, &registry, "show me all users", &cancel)
        .await
        .unwrap_err();

    assert!(err.is_transport());
    assert_eq!(session.state(), SessionState::Error);
    assert_eq!(session.messages().len(), 1);
}

#[tokio::test]
async fn test_clear_resets_everything() {
    let service = MockService::new();
    let mut session = ChatSession::new();
    let registry = SchemaRegistry::new();

    session.send(&service, &registry, "show me all users").await.unwrap();
    session.clear();

    assert!(session.messages().is_empty());
    assert_eq!(session.state(), SessionState::Idle);
    assert_eq!(session.last_response(), None);

    // The next turn starts a fresh history.
    session.send(&service, &registry, "count the orders").await.unwrap();
    assert_eq!(service.requests()[1].history.len(), 1);
}

#[tokio::test]
async fn test_blank_input_never_reaches_the_backend() {
    let service = MockService::new();
    let mut session = ChatSession::new();
    let registry = SchemaRegistry::new();

    let err = session.send(&service, &registry, "   ").await.unwrap_err();

    assert!(matches!(err, sql_desk::error::DeskError::Validation(_)));
    assert!(service.requests().is_empty());
    assert!(session.messages().is_empty());
    assert_eq!(session.state(), SessionState::Idle);
}
