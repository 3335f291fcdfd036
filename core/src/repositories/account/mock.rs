//! Mock implementation of AccountRepository for testing

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::domain::entities::account::Account;
use crate::errors::StoreError;
use crate::transaction::{BoundConnection, MockConnection};

use super::r#trait::AccountRepository;

/// Mock account repository operating on [`MockConnection`] state.
///
/// The rows live on the connection's shared table, not in the
/// repository, so transactional visibility (staged vs committed) behaves
/// like the real thing. Counts every store call so tests can assert how
/// many statements an operation issued.
pub struct MockAccountRepository {
    calls: AtomicUsize,
}

impl MockAccountRepository {
    /// Create a new mock repository
    pub fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of store calls issued through this repository.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn record_call(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

impl Default for MockAccountRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AccountRepository for MockAccountRepository {
    type Conn = MockConnection;

    async fn save(
        &self,
        conn: &BoundConnection<MockConnection>,
        account: Account,
    ) -> Result<Account, StoreError> {
        self.record_call();
        let mut lease = conn.lease().await;
        let session = lease.get_mut()?;
        session.insert(&account.id, account.balance).await?;
        tracing::debug!(account_id = %account.id, conn = session.id(), "account saved");
        Ok(account)
    }

    async fn find_by_id(
        &self,
        conn: &BoundConnection<MockConnection>,
        id: &str,
    ) -> Result<Account, StoreError> {
        self.record_call();
        let mut lease = conn.lease().await;
        let session = lease.get_mut()?;
        match session.select(id).await {
            Some(balance) => Ok(Account::new(id, balance)),
            None => Err(StoreError::NotFound { id: id.to_string() }),
        }
    }

    async fn update_balance(
        &self,
        conn: &BoundConnection<MockConnection>,
        id: &str,
        balance: i64,
    ) -> Result<(), StoreError> {
        self.record_call();
        let mut lease = conn.lease().await;
        let session = lease.get_mut()?;
        let matched = session.update(id, balance).await;
        if matched {
            tracing::debug!(account_id = %id, balance = balance, "balance updated");
        } else {
            tracing::warn!(account_id = %id, "balance update matched no rows");
        }
        Ok(())
    }

    async fn delete(
        &self,
        conn: &BoundConnection<MockConnection>,
        id: &str,
    ) -> Result<(), StoreError> {
        self.record_call();
        let mut lease = conn.lease().await;
        let session = lease.get_mut()?;
        let matched = session.remove(id).await;
        tracing::debug!(account_id = %id, matched = matched, "account deleted");
        Ok(())
    }
}
