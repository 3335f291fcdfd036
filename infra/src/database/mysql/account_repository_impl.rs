//! MySQL implementation of the AccountRepository trait.
//!
//! Every statement runs on the connection supplied by the caller, so a
//! surrounding transaction covers all of them together. This type never
//! acquires, closes, or commits a connection; it only issues SQL.
//!
//! Expected schema:
//!
//! ```sql
//! CREATE TABLE account (
//!     account_id VARCHAR(32) PRIMARY KEY,
//!     balance    BIGINT NOT NULL
//! );
//! ```

use async_trait::async_trait;
use sqlx::mysql::MySqlRow;
use sqlx::Row;

use teller_core::domain::entities::account::Account;
use teller_core::errors::{ErrorTranslator, StoreError};
use teller_core::repositories::AccountRepository;
use teller_core::transaction::BoundConnection;

use crate::database::connection::MySqlSession;
use crate::database::translate::MySqlErrorTranslator;

/// MySQL implementation of AccountRepository
///
/// Raw errors from SQLx are run through [`MySqlErrorTranslator`], so
/// callers see semantic store errors such as
/// [`StoreError::DuplicateKey`] instead of driver codes.
#[derive(Debug, Default)]
pub struct MySqlAccountRepository {
    translator: MySqlErrorTranslator,
}

impl MySqlAccountRepository {
    /// Create a new MySQL account repository
    pub fn new() -> Self {
        Self {
            translator: MySqlErrorTranslator::new(),
        }
    }

    /// Convert a database row to an Account entity
    fn row_to_account(&self, context: &str, row: &MySqlRow) -> Result<Account, StoreError> {
        let id: String = row
            .try_get("account_id")
            .map_err(|e| self.translator.translate(context, e))?;
        let balance: i64 = row
            .try_get("balance")
            .map_err(|e| self.translator.translate(context, e))?;
        Ok(Account::new(id, balance))
    }
}

#[async_trait]
impl AccountRepository for MySqlAccountRepository {
    type Conn = MySqlSession;

    async fn save(
        &self,
        conn: &BoundConnection<MySqlSession>,
        account: Account,
    ) -> Result<Account, StoreError> {
        let mut lease = conn.lease().await;
        let session = lease.get_mut()?;

        sqlx::query("INSERT INTO account (account_id, balance) VALUES (?, ?)")
            .bind(&account.id)
            .bind(account.balance)
            .execute(session.conn())
            .await
            .map_err(|e| self.translator.translate(&account.id, e))?;

        tracing::debug!(account_id = %account.id, balance = account.balance, "account saved");
        Ok(account)
    }

    async fn find_by_id(
        &self,
        conn: &BoundConnection<MySqlSession>,
        id: &str,
    ) -> Result<Account, StoreError> {
        let mut lease = conn.lease().await;
        let session = lease.get_mut()?;

        let row = sqlx::query("SELECT account_id, balance FROM account WHERE account_id = ?")
            .bind(id)
            .fetch_optional(session.conn())
            .await
            .map_err(|e| self.translator.translate(id, e))?;

        match row {
            Some(row) => self.row_to_account(id, &row),
            None => Err(StoreError::NotFound { id: id.to_string() }),
        }
    }

    async fn update_balance(
        &self,
        conn: &BoundConnection<MySqlSession>,
        id: &str,
        balance: i64,
    ) -> Result<(), StoreError> {
        let mut lease = conn.lease().await;
        let session = lease.get_mut()?;

        let result = sqlx::query("UPDATE account SET balance = ? WHERE account_id = ?")
            .bind(balance)
            .bind(id)
            .execute(session.conn())
            .await
            .map_err(|e| self.translator.translate(id, e))?;

        if result.rows_affected() == 0 {
            tracing::warn!(account_id = %id, "balance update matched no rows");
        } else {
            tracing::debug!(account_id = %id, balance = balance, "balance updated");
        }
        Ok(())
    }

    async fn delete(
        &self,
        conn: &BoundConnection<MySqlSession>,
        id: &str,
    ) -> Result<(), StoreError> {
        let mut lease = conn.lease().await;
        let session = lease.get_mut()?;

        let result = sqlx::query("DELETE FROM account WHERE account_id = ?")
            .bind(id)
            .execute(session.conn())
            .await
            .map_err(|e| self.translator.translate(id, e))?;

        // Deleting an absent row is fine; cleanup paths rely on it.
        tracing::debug!(account_id = %id, rows = result.rows_affected(), "account delete executed");
        Ok(())
    }
}
