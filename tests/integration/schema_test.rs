//! Schema registry integration tests.
//!
//! Exercises the refresh/upload/select flow against the mock backend.

use sql_desk::api::MockService;
use sql_desk::error::DeskError;
use sql_desk::schema::SchemaRegistry;

#[tokio::test]
async fn test_session_start_flow() {
    let service = MockService::new().with_schemas(vec!["users.txt", "loans.txt"]);
    let mut registry = SchemaRegistry::new();

    registry.refresh(&service).await.unwrap();

    assert_eq!(registry.known(), ["users.txt", "loans.txt"]);
    assert_eq!(registry.selected(), None);
    assert_eq!(registry.selected_or_empty(), "");
}

#[tokio::test]
async fn test_upload_then_select_flow() {
    let service = MockService::new();
    let mut registry = SchemaRegistry::new();
    registry.refresh(&service).await.unwrap();
    assert!(registry.known().is_empty());

    registry
        .upload(&service, "portfolio.txt", b"CREATE TABLE portfolio (...)".to_vec())
        .await
        .unwrap();
    registry.select(Some("portfolio.txt")).unwrap();

    assert_eq!(registry.selected(), Some("portfolio.txt"));
}

#[tokio::test]
async fn test_select_before_upload_is_rejected() {
    let service = MockService::new();
    let mut registry = SchemaRegistry::new();
    registry.refresh(&service).await.unwrap();

    let err = registry.select(Some("portfolio.txt")).unwrap_err();

    assert!(matches!(err, DeskError::Validation(_)));
}

#[tokio::test]
async fn test_backend_outage_preserves_known_list() {
    let service = MockService::new().with_schemas(vec!["users.txt"]);
    let mut registry = SchemaRegistry::new();
    registry.refresh(&service).await.unwrap();
    registry.select(Some("users.txt")).unwrap();

    let outage = MockService::failing();
    assert!(registry.refresh(&outage).await.is_err());
    assert!(registry
        .upload(&outage, "new.txt", b"CREATE TABLE t (id int)".to_vec())
        .await
        .is_err());

    assert_eq!(registry.known(), ["users.txt"]);
    assert_eq!(registry.selected(), Some("users.txt"));
}

#[tokio::test]
async fn test_upload_validates_extension_locally() {
    let service = MockService::new();
    let mut registry = SchemaRegistry::new();

    let err = registry
        .upload(&service, "schema.pdf", vec![1, 2, 3])
        .await
        .unwrap_err();

    assert!(matches!(err, DeskError::Validation(_)));
    assert!(err.to_string().contains(".txt"));
}
