//! Transfer business logic.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;

use crate::errors::{TransferError, ValidationError};
use crate::repositories::AccountRepository;
use crate::transaction::BoundConnection;

use super::traits::TransferLogic;

/// Account-transfer business sequence: read both rows, debit the
/// source, validate, credit the target.
///
/// The validation gate sits between the two balance updates. When it
/// rejects a transfer the source account has already been debited on the
/// connection, so only the caller's rollback restores it; this ordering
/// is what the atomicity tests lean on.
pub struct TransferService<R> {
    repository: Arc<R>,
    frozen_accounts: HashSet<String>,
}

impl<R> TransferService<R> {
    pub fn new(repository: Arc<R>) -> Self {
        Self {
            repository,
            frozen_accounts: HashSet::new(),
        }
    }

    /// Marks an account as frozen; transfers into it are rejected at the
    /// validation step.
    pub fn with_frozen_account(mut self, id: impl Into<String>) -> Self {
        self.frozen_accounts.insert(id.into());
        self
    }

    fn validate_target(&self, id: &str) -> Result<(), ValidationError> {
        if self.frozen_accounts.contains(id) {
            return Err(ValidationError::AccountFrozen { id: id.to_string() });
        }
        Ok(())
    }
}

#[async_trait]
impl<R> TransferLogic for TransferService<R>
where
    R: AccountRepository,
{
    type Conn = R::Conn;

    async fn transfer_on(
        &self,
        conn: BoundConnection<R::Conn>,
        from_id: &str,
        to_id: &str,
        amount: i64,
    ) -> Result<(), TransferError> {
        tracing::debug!(from = %from_id, to = %to_id, amount = amount, "transfer started");

        let from = self.repository.find_by_id(&conn, from_id).await?;
        let to = self.repository.find_by_id(&conn, to_id).await?;

        self.repository
            .update_balance(&conn, from_id, from.balance - amount)
            .await?;
        tracing::debug!(from = %from_id, step = "debit", "source debited");

        self.validate_target(to_id)?;

        self.repository
            .update_balance(&conn, to_id, to.balance + amount)
            .await?;
        tracing::debug!(to = %to_id, step = "credit", "target credited");

        Ok(())
    }
}
