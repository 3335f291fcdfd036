//! Tests for TransactionCoordinator: the four-style contract in one place.

use std::sync::Arc;
use std::time::Duration;

use crate::errors::{
    AcquireError, DeadlineExceeded, OperationError, StoreError,
};
use crate::transaction::{MockConnectionSource, TransactionCoordinator};

#[tokio::test]
async fn test_execute_commits_on_success() {
    let source = Arc::new(MockConnectionSource::new());
    source.seed("acc-a", 1_000).await;
    let coordinator = TransactionCoordinator::new(Arc::clone(&source));

    let result = coordinator
        .execute(|conn| async move {
            let mut lease = conn.lease().await;
            let session = lease.get_mut()?;
            session.update("acc-a", 1_100).await;
            Ok::<(), StoreError>(())
        })
        .await;

    assert!(result.is_ok());
    assert_eq!(source.balance("acc-a").await, Some(1_100));
    assert_eq!(source.acquired_count(), 1);
    assert_eq!(source.released_count(), 1);
    assert_eq!(source.released_in_transaction_count(), 0);
}

#[tokio::test]
async fn test_execute_rolls_back_on_business_error() {
    let source = Arc::new(MockConnectionSource::new());
    source.seed("acc-a", 1_000).await;
    let coordinator = TransactionCoordinator::new(Arc::clone(&source));

    let result: Result<(), OperationError> = coordinator
        .execute(|conn| async move {
            let mut lease = conn.lease().await;
            let session = lease.get_mut()?;
            session.update("acc-a", 9_999).await;
            drop(lease);
            Err(StoreError::Execution {
                message: "boom".to_string(),
            })
        })
        .await;

    let err = result.unwrap_err();
    let cause = err.rollback_cause().expect("rolled back");
    assert!(cause.downcast_ref::<StoreError>().is_some());

    assert_eq!(source.balance("acc-a").await, Some(1_000));
    assert_eq!(source.released_count(), 1);
}

#[tokio::test]
async fn test_execute_reports_acquire_failure_without_store_calls() {
    let source = Arc::new(MockConnectionSource::new().with_capacity(0));
    let coordinator = TransactionCoordinator::new(Arc::clone(&source));

    let ran = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let flag = Arc::clone(&ran);
    let result: Result<(), OperationError> = coordinator
        .execute(move |_conn| async move {
            flag.store(true, std::sync::atomic::Ordering::SeqCst);
            Ok::<(), StoreError>(())
        })
        .await;

    assert!(matches!(
        result,
        Err(OperationError::Acquire(AcquireError::Unavailable { .. }))
    ));
    // The business steps never ran and nothing was acquired or released.
    assert!(!ran.load(std::sync::atomic::Ordering::SeqCst));
    assert_eq!(source.acquired_count(), 0);
    assert_eq!(source.released_count(), 0);
}

#[tokio::test]
async fn test_managed_commit_and_rollback() {
    let source = Arc::new(MockConnectionSource::new());
    source.seed("acc-a", 1_000).await;
    let coordinator = TransactionCoordinator::new(Arc::clone(&source));

    let ctx = coordinator.begin().await.unwrap();
    let conn = ctx.current();
    let mut lease = conn.lease().await;
    lease.get_mut().unwrap().update("acc-a", 2_000).await;
    drop(lease);
    coordinator.commit(ctx).await.unwrap();
    assert_eq!(source.balance("acc-a").await, Some(2_000));

    let ctx = coordinator.begin().await.unwrap();
    let conn = ctx.current();
    let mut lease = conn.lease().await;
    lease.get_mut().unwrap().update("acc-a", 9_999).await;
    drop(lease);
    coordinator.rollback(ctx).await.unwrap();
    assert_eq!(source.balance("acc-a").await, Some(2_000));

    assert_eq!(source.acquired_count(), 2);
    assert_eq!(source.released_count(), 2);
}

#[tokio::test]
async fn test_commit_failure_is_rolled_back() {
    let source = Arc::new(MockConnectionSource::new().with_broken_commit());
    source.seed("acc-a", 1_000).await;
    let coordinator = TransactionCoordinator::new(Arc::clone(&source));

    let result: Result<(), OperationError> = coordinator
        .execute(|conn| async move {
            let mut lease = conn.lease().await;
            let session = lease.get_mut()?;
            session.update("acc-a", 2_000).await;
            Ok::<(), StoreError>(())
        })
        .await;

    let err = result.unwrap_err();
    let cause = err.rollback_cause().expect("rolled back");
    let store = cause.downcast_ref::<StoreError>().expect("store error");
    assert!(matches!(store, StoreError::Execution { .. }));

    assert_eq!(source.balance("acc-a").await, Some(1_000));
    assert_eq!(source.released_count(), 1);
}

#[tokio::test]
async fn test_rollback_failure_on_managed_path() {
    let source = Arc::new(MockConnectionSource::new().with_broken_rollback());
    let coordinator = TransactionCoordinator::new(Arc::clone(&source));

    let ctx = coordinator.begin().await.unwrap();
    let err = coordinator.rollback(ctx).await.unwrap_err();

    assert!(matches!(err, OperationError::RollbackFailed { .. }));
    assert_eq!(source.released_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_deadline_overrun_rolls_back() {
    let source = Arc::new(MockConnectionSource::new());
    source.seed("acc-a", 1_000).await;
    let coordinator = TransactionCoordinator::new(Arc::clone(&source))
        .with_operation_timeout(Duration::from_millis(50));

    let result: Result<(), OperationError> = coordinator
        .execute(|conn| async move {
            let mut lease = conn.lease().await;
            let session = lease.get_mut()?;
            session.update("acc-a", 9_999).await;
            drop(lease);
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok::<(), StoreError>(())
        })
        .await;

    let err = result.unwrap_err();
    let cause = err.rollback_cause().expect("rolled back");
    assert!(cause.downcast_ref::<DeadlineExceeded>().is_some());

    assert_eq!(source.balance("acc-a").await, Some(1_000));
    assert_eq!(source.released_count(), 1);
}

#[tokio::test]
async fn test_with_connection_commits_each_write_immediately() {
    let source = Arc::new(MockConnectionSource::new());
    source.seed("acc-a", 1_000).await;
    let coordinator = TransactionCoordinator::new(Arc::clone(&source));

    // The failure happens after the write, but auto-commit already
    // published it: this is exactly the outcome transactions prevent.
    let result: Result<(), StoreError> = coordinator
        .with_connection(|conn| async move {
            let mut lease = conn.lease().await;
            let session = lease.get_mut()?;
            session.update("acc-a", 500).await;
            drop(lease);
            Err(StoreError::Execution {
                message: "late failure".to_string(),
            })
        })
        .await;

    assert!(result.is_err());
    assert_eq!(source.balance("acc-a").await, Some(500));
    assert_eq!(source.released_count(), 1);
    assert_eq!(source.released_in_transaction_count(), 0);
}

#[tokio::test]
async fn test_with_connection_surfaces_acquire_on_store_channel() {
    let source = Arc::new(MockConnectionSource::new().with_capacity(0));
    let coordinator = TransactionCoordinator::new(Arc::clone(&source));

    let result: Result<(), StoreError> = coordinator
        .with_connection(|_conn| async move { Ok(()) })
        .await;

    assert!(matches!(result, Err(StoreError::Connection { .. })));
}

#[tokio::test]
async fn test_sequential_operations_use_distinct_connections() {
    let source = Arc::new(MockConnectionSource::new());
    let coordinator = TransactionCoordinator::new(Arc::clone(&source));

    let first_id = coordinator
        .execute(|conn| async move {
            let mut lease = conn.lease().await;
            Ok::<u64, StoreError>(lease.get_mut()?.id())
        })
        .await
        .unwrap();

    let second_id = coordinator
        .execute(|conn| async move {
            let mut lease = conn.lease().await;
            Ok::<u64, StoreError>(lease.get_mut()?.id())
        })
        .await
        .unwrap();

    assert_ne!(first_id, second_id);
    assert_eq!(source.acquired_count(), 2);
    assert_eq!(source.released_count(), 2);
}
