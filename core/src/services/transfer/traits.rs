//! Capability traits for the transfer operation.

use async_trait::async_trait;

use crate::errors::{OperationError, TransferError};
use crate::transaction::{BoundConnection, TransactionalConnection};

/// Moves funds between two accounts as one atomic operation.
///
/// Implementations own the whole transaction; callers never see a
/// connection or any transaction plumbing. A transfer either commits
/// both balance changes or leaves both untouched.
#[async_trait]
pub trait AccountTransfer: Send + Sync {
    /// Transfers `amount` from `from_id` to `to_id`.
    ///
    /// # Returns
    /// * `Ok(())` - Both balance changes are committed
    /// * `Err(OperationError::RolledBack)` - The operation started and
    ///   was undone; the cause carries the business failure
    /// * `Err(OperationError::Acquire)` - The operation never started
    async fn transfer(
        &self,
        from_id: &str,
        to_id: &str,
        amount: i64,
    ) -> Result<(), OperationError>;
}

/// The business steps of a transfer, run against an already-bound
/// connection.
///
/// The caller owns the transaction boundary: this trait neither commits
/// nor rolls back, it only issues the store calls on `conn`.
#[async_trait]
pub trait TransferLogic: Send + Sync {
    /// The connection type the store calls run on.
    type Conn: TransactionalConnection;

    /// Runs the debit, validation, and credit steps on `conn`.
    async fn transfer_on(
        &self,
        conn: BoundConnection<Self::Conn>,
        from_id: &str,
        to_id: &str,
        amount: i64,
    ) -> Result<(), TransferError>;
}
