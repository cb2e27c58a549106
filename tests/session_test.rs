//! Integration tests for session lifecycle rules that hold without a live
//! database server.

use db_analyst_mcp::db::SessionManager;
use db_analyst_mcp::error::DbError;

/// Query operations before any connect fail with NotConnected.
#[tokio::test]
async fn test_execute_before_connect_fails() {
    let session = SessionManager::new();
    let err = session.execute("SELECT 1", &[]).await.unwrap_err();
    assert!(matches!(err, DbError::NotConnected { .. }));
    assert!(err.to_string().contains("Not connected"));
}

/// The pool accessor enforces the same rule for introspection paths.
#[tokio::test]
async fn test_pool_before_connect_fails() {
    let session = SessionManager::new();
    assert!(matches!(
        session.pool().await,
        Err(DbError::NotConnected { .. })
    ));
}

/// An unknown URL scheme is rejected before any socket is opened, and the
/// failed attempt leaves session state unchanged.
#[tokio::test]
async fn test_unknown_scheme_rejected() {
    let session = SessionManager::new();
    let err = session
        .connect_from_url("redis://localhost:6379/0")
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::UnsupportedBackend { .. }));
    assert!(err.to_string().contains("redis"));
    assert!(!session.is_connected().await);
}

/// close() is idempotent and a closed session refuses queries.
#[tokio::test]
async fn test_close_idempotent_and_terminal() {
    let session = SessionManager::new();
    session.close().await;
    session.close().await;
    assert!(!session.is_connected().await);
    assert!(matches!(
        session.execute("SELECT 1", &[]).await,
        Err(DbError::NotConnected { .. })
    ));
}

/// Sessions are plain values: two can coexist in one process.
#[tokio::test]
async fn test_sessions_are_independent() {
    let a = SessionManager::new();
    let b = SessionManager::new();
    a.close().await;
    assert!(!a.is_connected().await);
    assert!(!b.is_connected().await);
    // b is still Disconnected, not Closed - it can still refuse queries its own way
    assert!(matches!(
        b.execute("SELECT 1", &[]).await,
        Err(DbError::NotConnected { .. })
    ));
}
