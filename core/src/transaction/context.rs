//! Transaction context owning the connection binding for one operation.

use uuid::Uuid;

use crate::errors::{AcquireError, StoreError};

use super::binding::BoundConnection;
use super::source::{ConnectionSource, TransactionalConnection};

/// Completion state of a transaction context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TxState {
    Active,
    Committed,
    RolledBack,
}

/// Owns the one connection bound to a logical operation, from `begin`
/// to `end`.
///
/// The context is a value passed through the call chain; there is no
/// ambient registry, so concurrent operations cannot see each other's
/// bindings. Whatever happens in between, [`end`] releases the
/// connection back to the source it came from; application code never
/// calls [`ConnectionSource::release`] itself on this path.
///
/// [`end`]: TransactionContext::end
#[derive(Debug)]
pub struct TransactionContext<C: TransactionalConnection> {
    binding: BoundConnection<C>,
    tx_id: Uuid,
    state: TxState,
}

impl<C: TransactionalConnection> TransactionContext<C> {
    /// Starts a transaction: acquires a connection, switches it out of
    /// auto-commit, and binds it to the new context.
    ///
    /// If the acquired connection cannot enter transaction mode it is
    /// released before the error returns, so acquires and releases stay
    /// balanced even when `begin` fails.
    pub async fn begin<S>(source: &S) -> Result<Self, AcquireError>
    where
        S: ConnectionSource<Conn = C>,
    {
        let mut conn = source.acquire().await?;
        if let Err(err) = conn.set_auto_commit(false).await {
            source.release(conn).await;
            return Err(AcquireError::Unusable { source: err });
        }
        let tx_id = Uuid::new_v4();
        tracing::debug!(tx = %tx_id, "transaction started");
        Ok(Self {
            binding: BoundConnection::bind(conn),
            tx_id,
            state: TxState::Active,
        })
    }

    /// Handle to the connection bound to this operation.
    ///
    /// Every call returns a handle to the same physical connection; store
    /// calls made with it all land on that connection.
    pub fn current(&self) -> BoundConnection<C> {
        self.binding.clone()
    }

    /// Identifier correlating log lines for this transaction.
    pub fn tx_id(&self) -> Uuid {
        self.tx_id
    }

    /// Makes the pending work permanent.
    ///
    /// A context completes at most once: committing after a commit or
    /// rollback returns [`StoreError::AlreadyCompleted`].
    pub async fn commit(&mut self) -> Result<(), StoreError> {
        self.ensure_active()?;
        let mut lease = self.binding.lease().await;
        lease.get_mut()?.commit().await?;
        self.state = TxState::Committed;
        tracing::info!(tx = %self.tx_id, "transaction committed");
        Ok(())
    }

    /// Discards the pending work.
    ///
    /// Subject to the same once-only rule as [`commit`].
    ///
    /// [`commit`]: TransactionContext::commit
    pub async fn rollback(&mut self) -> Result<(), StoreError> {
        self.ensure_active()?;
        let mut lease = self.binding.lease().await;
        lease.get_mut()?.rollback().await?;
        self.state = TxState::RolledBack;
        tracing::warn!(tx = %self.tx_id, "transaction rolled back");
        Ok(())
    }

    /// Ends the operation: rolls back anything still pending, restores
    /// auto-commit, unbinds outstanding handles, and releases the
    /// connection back to `source`.
    ///
    /// Runs on every exit path and never fails; problems on the way out
    /// are logged. After this call any leftover [`BoundConnection`]
    /// handle observes [`StoreError::Unbound`].
    pub async fn end<S>(self, source: &S)
    where
        S: ConnectionSource<Conn = C>,
    {
        let mut conn = match self.binding.unbind().await {
            Some(conn) => conn,
            None => {
                tracing::error!(tx = %self.tx_id, "connection was already unbound at end of operation");
                return;
            }
        };
        if matches!(self.state, TxState::Active) {
            tracing::warn!(tx = %self.tx_id, "ending an active transaction; pending work is rolled back");
            if let Err(err) = conn.rollback().await {
                tracing::error!(tx = %self.tx_id, error = %err, "rollback on end failed");
            }
        }
        if let Err(err) = conn.set_auto_commit(true).await {
            tracing::error!(tx = %self.tx_id, error = %err, "failed to restore auto-commit before release");
        }
        source.release(conn).await;
        tracing::debug!(tx = %self.tx_id, "connection released");
    }

    fn ensure_active(&self) -> Result<(), StoreError> {
        match self.state {
            TxState::Active => Ok(()),
            TxState::Committed => Err(StoreError::AlreadyCompleted {
                outcome: "committed",
            }),
            TxState::RolledBack => Err(StoreError::AlreadyCompleted {
                outcome: "rolled back",
            }),
        }
    }
}
