//! Session Tests

use medflow_core::keys::SESSION_KEY;
use medflow_core::Session;
use medflow_store::FileStore;
use medflow_test_utils::*;
use std::sync::Arc;

#[tokio::test]
async fn test_resolve_without_session() {
    let store = memory_store();
    let session = Session::new(shared(&store));

    assert!(session.resolve().await.is_none());
}

#[tokio::test]
async fn test_start_then_resolve_then_end() {
    let store = memory_store();
    let session = Session::new(shared(&store));
    let ana = identity("admin123", "Ana García");

    session.start(&ana).await.unwrap();
    assert_eq!(session.resolve().await, Some(ana));

    session.end().await.unwrap();
    assert!(session.resolve().await.is_none());
    assert!(store.peek(SESSION_KEY).is_none());
}

#[tokio::test]
async fn test_end_is_idempotent() {
    let store = memory_store();
    let session = Session::new(shared(&store));

    assert!(session.end().await.is_ok());
    assert!(session.end().await.is_ok());
}

#[tokio::test]
async fn test_malformed_session_is_unauthenticated() {
    let store = memory_store();
    store.put_raw(SESSION_KEY, "not-json");
    let session = Session::new(shared(&store));

    assert!(session.resolve().await.is_none());
}

#[tokio::test]
async fn test_session_missing_fields_is_unauthenticated() {
    let store = memory_store();
    store.put_raw(SESSION_KEY, r#"{"cc":"admin123"}"#);
    let session = Session::new(shared(&store));

    assert!(session.resolve().await.is_none());
}

#[tokio::test]
async fn test_session_survives_restart() {
    let dir = tempfile::TempDir::new().unwrap();
    let ana = identity("admin123", "Ana García");

    {
        let store = FileStore::open(dir.path()).await.unwrap();
        Session::new(Arc::new(store)).start(&ana).await.unwrap();
    }

    let store = FileStore::open(dir.path()).await.unwrap();
    assert_eq!(Session::new(Arc::new(store)).resolve().await, Some(ana));
}
