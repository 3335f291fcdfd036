//! Contracts for obtaining connections and driving their commit mode.

use async_trait::async_trait;

use crate::errors::{AcquireError, StoreError};

/// A connection whose commit behavior can be switched and driven.
///
/// Connections start in auto-commit mode: every statement commits on its
/// own. Switching auto-commit off opens a unit of work that stays pending
/// until `commit` or `rollback`.
#[async_trait]
pub trait TransactionalConnection: Send + 'static {
    /// Switches auto-commit on or off for subsequent statements.
    async fn set_auto_commit(&mut self, enabled: bool) -> Result<(), StoreError>;

    /// Makes all pending writes permanent.
    async fn commit(&mut self) -> Result<(), StoreError>;

    /// Discards all pending writes.
    async fn rollback(&mut self) -> Result<(), StoreError>;
}

/// Hands out connections and takes them back.
///
/// A source may be pool-backed or may open a fresh connection per
/// `acquire`; callers cannot tell the difference. On the transactional
/// path the [`TransactionContext`] is the only caller of `release`:
/// application code hands the connection's lifecycle to the context and
/// never returns one directly.
///
/// [`TransactionContext`]: crate::transaction::TransactionContext
#[async_trait]
pub trait ConnectionSource: Send + Sync {
    /// The connection type this source hands out.
    type Conn: TransactionalConnection;

    /// Obtains a connection.
    ///
    /// # Returns
    /// * `Ok(conn)` - A connection ready for use, in auto-commit mode
    /// * `Err(AcquireError)` - No connection could be obtained; nothing
    ///   was started and there is nothing to clean up
    async fn acquire(&self) -> Result<Self::Conn, AcquireError>;

    /// Returns a connection to the source.
    ///
    /// Never fails; a source that cannot take a connection back logs the
    /// problem and drops it.
    async fn release(&self, conn: Self::Conn);
}
