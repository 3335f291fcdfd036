//! Transparent transactional wrapper for transfer logic.

use std::sync::Arc;

use async_trait::async_trait;

use crate::errors::OperationError;
use crate::transaction::{ConnectionSource, TransactionCoordinator};

use super::traits::{AccountTransfer, TransferLogic};

/// Decorates a [`TransferLogic`] value with the full transaction
/// contract.
///
/// This is the transparent style: callers hold an [`AccountTransfer`]
/// and stay oblivious to connections and transactions, while every call
/// runs the delegate inside [`TransactionCoordinator::execute`].
pub struct TransactionalTransfer<S, L>
where
    S: ConnectionSource,
{
    coordinator: TransactionCoordinator<S>,
    logic: Arc<L>,
}

impl<S, L> TransactionalTransfer<S, L>
where
    S: ConnectionSource,
{
    pub fn new(coordinator: TransactionCoordinator<S>, logic: Arc<L>) -> Self {
        Self { coordinator, logic }
    }
}

#[async_trait]
impl<S, L> AccountTransfer for TransactionalTransfer<S, L>
where
    S: ConnectionSource,
    L: TransferLogic<Conn = S::Conn>,
{
    async fn transfer(
        &self,
        from_id: &str,
        to_id: &str,
        amount: i64,
    ) -> Result<(), OperationError> {
        let logic = Arc::clone(&self.logic);
        let from = from_id.to_string();
        let to = to_id.to_string();
        let result = self
            .coordinator
            .execute(move |conn| async move {
                logic.transfer_on(conn, &from, &to, amount).await
            })
            .await;
        match &result {
            Ok(()) => {
                tracing::info!(from = %from_id, to = %to_id, amount = amount, "transfer committed")
            }
            Err(err) => {
                tracing::warn!(from = %from_id, to = %to_id, amount = amount, error = %err, "transfer failed")
            }
        }
        result
    }
}
