//! Tests for TransactionContext: binding, completion, and release.

use crate::errors::{AcquireError, StoreError};
use crate::transaction::{MockConnectionSource, TransactionContext};

#[tokio::test]
async fn test_begin_switches_off_auto_commit() {
    let source = MockConnectionSource::new();

    let ctx = TransactionContext::begin(&source).await.unwrap();

    let conn = ctx.current();
    let mut lease = conn.lease().await;
    let session = lease.get_mut().unwrap();
    assert!(!session.is_auto_commit());
    drop(lease);

    assert_eq!(source.acquired_count(), 1);
    assert_eq!(source.released_count(), 0);

    ctx.end(&source).await;
}

#[tokio::test]
async fn test_handles_share_one_physical_connection() {
    let source = MockConnectionSource::new();
    let ctx = TransactionContext::begin(&source).await.unwrap();

    let first = ctx.current();
    let second = ctx.current();
    assert!(first.same_as(&second));

    let mut lease = first.lease().await;
    let first_id = lease.get_mut().unwrap().id();
    drop(lease);
    let mut lease = second.lease().await;
    let second_id = lease.get_mut().unwrap().id();
    drop(lease);
    assert_eq!(first_id, second_id);

    // The whole operation used a single acquire.
    assert_eq!(source.acquired_count(), 1);

    ctx.end(&source).await;
}

#[tokio::test]
async fn test_commit_publishes_staged_writes() {
    let source = MockConnectionSource::new();
    source.seed("acc-a", 5_000).await;

    let mut ctx = TransactionContext::begin(&source).await.unwrap();
    let conn = ctx.current();

    let mut lease = conn.lease().await;
    assert!(lease.get_mut().unwrap().update("acc-a", 7_000).await);
    drop(lease);

    // Still staged: the shared table has not changed yet.
    assert_eq!(source.balance("acc-a").await, Some(5_000));

    ctx.commit().await.unwrap();
    assert_eq!(source.balance("acc-a").await, Some(7_000));

    ctx.end(&source).await;
    assert_eq!(source.released_count(), 1);
}

#[tokio::test]
async fn test_rollback_discards_staged_writes() {
    let source = MockConnectionSource::new();
    source.seed("acc-a", 5_000).await;

    let mut ctx = TransactionContext::begin(&source).await.unwrap();
    let conn = ctx.current();

    let mut lease = conn.lease().await;
    assert!(lease.get_mut().unwrap().update("acc-a", 9_999).await);
    drop(lease);

    ctx.rollback().await.unwrap();
    ctx.end(&source).await;

    assert_eq!(source.balance("acc-a").await, Some(5_000));
}

#[tokio::test]
async fn test_second_completion_is_an_error() {
    let source = MockConnectionSource::new();

    let mut ctx = TransactionContext::begin(&source).await.unwrap();
    ctx.commit().await.unwrap();

    let err = ctx.commit().await.unwrap_err();
    assert!(matches!(
        err,
        StoreError::AlreadyCompleted {
            outcome: "committed"
        }
    ));

    let err = ctx.rollback().await.unwrap_err();
    assert!(matches!(err, StoreError::AlreadyCompleted { .. }));

    ctx.end(&source).await;
}

#[tokio::test]
async fn test_end_restores_auto_commit_before_release() {
    let source = MockConnectionSource::new();

    let mut ctx = TransactionContext::begin(&source).await.unwrap();
    ctx.commit().await.unwrap();
    ctx.end(&source).await;

    assert_eq!(source.acquired_count(), 1);
    assert_eq!(source.released_count(), 1);
    assert_eq!(source.outstanding_count(), 0);
    assert_eq!(source.released_in_transaction_count(), 0);
}

#[tokio::test]
async fn test_handle_after_end_observes_unbound() {
    let source = MockConnectionSource::new();

    let mut ctx = TransactionContext::begin(&source).await.unwrap();
    let leaked = ctx.current();
    ctx.commit().await.unwrap();
    ctx.end(&source).await;

    assert!(!leaked.is_bound().await);
    let mut lease = leaked.lease().await;
    assert!(matches!(lease.get_mut(), Err(StoreError::Unbound)));
}

#[tokio::test]
async fn test_begin_releases_connection_that_cannot_enter_transaction_mode() {
    let source = MockConnectionSource::new().with_broken_transaction_mode();

    let err = TransactionContext::begin(&source).await.unwrap_err();
    assert!(matches!(err, AcquireError::Unusable { .. }));

    // The acquired connection went back even though begin failed.
    assert_eq!(source.acquired_count(), 1);
    assert_eq!(source.released_count(), 1);
    assert_eq!(source.outstanding_count(), 0);
}

#[tokio::test]
async fn test_end_while_active_rolls_back_pending_work() {
    let source = MockConnectionSource::new();
    source.seed("acc-a", 5_000).await;

    let ctx = TransactionContext::begin(&source).await.unwrap();
    let conn = ctx.current();

    let mut lease = conn.lease().await;
    assert!(lease.get_mut().unwrap().update("acc-a", 1).await);
    drop(lease);

    // No commit, no rollback: ending the context discards the work.
    ctx.end(&source).await;

    assert_eq!(source.balance("acc-a").await, Some(5_000));
    assert_eq!(source.released_count(), 1);
    assert_eq!(source.released_in_transaction_count(), 0);
}
