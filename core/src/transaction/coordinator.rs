//! Coordinates the commit-or-rollback contract around business steps.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::errors::{AcquireError, DeadlineExceeded, OperationError, StoreError};

use super::binding::BoundConnection;
use super::context::TransactionContext;
use super::source::ConnectionSource;

type BoxedCause = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Applies begin, commit-or-rollback, and end around business steps.
///
/// One coordinator serves any number of operations; each operation gets
/// its own [`TransactionContext`]. The contract exists once, here: the
/// managed, templated, and transparent usage styles only differ in how
/// much of it the call site spells out.
pub struct TransactionCoordinator<S: ConnectionSource> {
    source: Arc<S>,
    operation_timeout: Option<Duration>,
}

impl<S: ConnectionSource> Clone for TransactionCoordinator<S> {
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
            operation_timeout: self.operation_timeout,
        }
    }
}

impl<S: ConnectionSource> TransactionCoordinator<S> {
    pub fn new(source: Arc<S>) -> Self {
        Self {
            source,
            operation_timeout: None,
        }
    }

    /// Caps the business section of [`execute`] at `timeout`.
    ///
    /// Operations that overrun the deadline are rolled back and fail
    /// with [`DeadlineExceeded`] as the cause.
    ///
    /// [`execute`]: TransactionCoordinator::execute
    pub fn with_operation_timeout(mut self, timeout: Duration) -> Self {
        self.operation_timeout = Some(timeout);
        self
    }

    /// The source this coordinator acquires connections from.
    pub fn source(&self) -> &Arc<S> {
        &self.source
    }

    /// Starts a transaction for a caller that drives the context itself.
    pub async fn begin(&self) -> Result<TransactionContext<S::Conn>, AcquireError> {
        TransactionContext::begin(self.source.as_ref()).await
    }

    /// Commits `ctx` and ends it.
    ///
    /// If the commit fails, the pending work is rolled back instead and
    /// the commit failure is reported as the rollback cause.
    pub async fn commit(
        &self,
        mut ctx: TransactionContext<S::Conn>,
    ) -> Result<(), OperationError> {
        match ctx.commit().await {
            Ok(()) => {
                ctx.end(self.source.as_ref()).await;
                Ok(())
            }
            Err(commit_err) => Err(self.fail(ctx, Box::new(commit_err)).await),
        }
    }

    /// Rolls `ctx` back and ends it.
    pub async fn rollback(
        &self,
        mut ctx: TransactionContext<S::Conn>,
    ) -> Result<(), OperationError> {
        let result = ctx.rollback().await;
        ctx.end(self.source.as_ref()).await;
        result.map_err(|source| OperationError::RollbackFailed { source })
    }

    /// Runs `op` inside a transaction: begin, business steps, commit on
    /// success or rollback on failure, end.
    ///
    /// The closure receives the bound connection that every store call
    /// inside the operation must use. A business error rolls the work
    /// back and comes back as [`OperationError::RolledBack`] with the
    /// original error as the cause; a failure to even start comes back
    /// as [`OperationError::Acquire`].
    pub async fn execute<T, E, F, Fut>(&self, op: F) -> Result<T, OperationError>
    where
        F: FnOnce(BoundConnection<S::Conn>) -> Fut + Send,
        Fut: Future<Output = Result<T, E>> + Send,
        T: Send,
        E: std::error::Error + Send + Sync + 'static,
    {
        let mut ctx = TransactionContext::begin(self.source.as_ref()).await?;
        let business = op(ctx.current());
        let outcome = match self.operation_timeout {
            Some(limit) => match tokio::time::timeout(limit, business).await {
                Ok(result) => result.map_err(|err| Box::new(err) as BoxedCause),
                Err(_) => {
                    tracing::warn!(tx = %ctx.tx_id(), limit = ?limit, "operation deadline exceeded");
                    Err(Box::new(DeadlineExceeded { limit }) as BoxedCause)
                }
            },
            None => business.await.map_err(|err| Box::new(err) as BoxedCause),
        };
        match outcome {
            Ok(value) => match ctx.commit().await {
                Ok(()) => {
                    ctx.end(self.source.as_ref()).await;
                    Ok(value)
                }
                Err(commit_err) => Err(self.fail(ctx, Box::new(commit_err)).await),
            },
            Err(cause) => Err(self.fail(ctx, cause).await),
        }
    }

    /// Runs `op` against a connection in auto-commit mode, outside any
    /// transaction.
    ///
    /// Each store call commits on its own, so a failure part way through
    /// leaves earlier writes in place. Acquisition failures surface on
    /// the store error channel here; there is no transaction whose
    /// tri-state outcome would need them kept apart.
    pub async fn with_connection<T, F, Fut>(&self, op: F) -> Result<T, StoreError>
    where
        F: FnOnce(BoundConnection<S::Conn>) -> Fut + Send,
        Fut: Future<Output = Result<T, StoreError>> + Send,
        T: Send,
    {
        let conn = self.source.acquire().await?;
        let binding = BoundConnection::bind(conn);
        let result = op(binding.clone()).await;
        match binding.unbind().await {
            Some(conn) => self.source.release(conn).await,
            None => {
                tracing::error!("connection binding was emptied inside a scoped operation")
            }
        }
        result
    }

    /// Rolls back after a failure, preserving `cause` as the reported
    /// reason even if the rollback itself fails.
    async fn fail(
        &self,
        mut ctx: TransactionContext<S::Conn>,
        cause: BoxedCause,
    ) -> OperationError {
        let tx = ctx.tx_id();
        if let Err(rollback_err) = ctx.rollback().await {
            tracing::error!(tx = %tx, error = %rollback_err, "rollback after failure also failed");
        }
        ctx.end(self.source.as_ref()).await;
        OperationError::RolledBack { cause }
    }
}
