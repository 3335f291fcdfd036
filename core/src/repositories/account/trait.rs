//! Account repository trait defining the interface for account row access.
//!
//! Every operation runs against a connection supplied by the caller, so
//! a multi-step business operation can put all of its statements on one
//! connection and commit or roll them back together. Implementations
//! never acquire, close, release, or change the commit mode of the
//! connection they are handed; that is the transaction context's job.

use async_trait::async_trait;

use crate::domain::entities::account::Account;
use crate::errors::StoreError;
use crate::transaction::{BoundConnection, TransactionalConnection};

/// Repository trait for single-row account access on a supplied
/// connection.
///
/// # Example Implementation
/// ```no_run
/// use async_trait::async_trait;
/// use teller_core::domain::entities::account::Account;
/// use teller_core::errors::StoreError;
/// use teller_core::repositories::AccountRepository;
/// use teller_core::transaction::{BoundConnection, MockConnection};
///
/// struct NullAccountRepository;
///
/// #[async_trait]
/// impl AccountRepository for NullAccountRepository {
///     type Conn = MockConnection;
///
///     async fn save(
///         &self,
///         _conn: &BoundConnection<MockConnection>,
///         account: Account,
///     ) -> Result<Account, StoreError> {
///         Ok(account)
///     }
///
///     async fn find_by_id(
///         &self,
///         _conn: &BoundConnection<MockConnection>,
///         id: &str,
///     ) -> Result<Account, StoreError> {
///         Err(StoreError::NotFound { id: id.to_string() })
///     }
///
///     async fn update_balance(
///         &self,
///         _conn: &BoundConnection<MockConnection>,
///         _id: &str,
///         _balance: i64,
///     ) -> Result<(), StoreError> {
///         Ok(())
///     }
///
///     async fn delete(
///         &self,
///         _conn: &BoundConnection<MockConnection>,
///         _id: &str,
///     ) -> Result<(), StoreError> {
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// The connection type this repository issues statements on.
    type Conn: TransactionalConnection;

    /// Insert a new account row
    ///
    /// # Arguments
    /// * `conn` - The bound connection to run the statement on
    /// * `account` - The account to persist
    ///
    /// # Returns
    /// * `Ok(Account)` - The stored account
    /// * `Err(StoreError::DuplicateKey)` - A row with this id already exists
    /// * `Err(StoreError)` - The statement failed
    async fn save(
        &self,
        conn: &BoundConnection<Self::Conn>,
        account: Account,
    ) -> Result<Account, StoreError>;

    /// Find an account row by its id
    ///
    /// # Arguments
    /// * `conn` - The bound connection to run the statement on
    /// * `id` - The account id to look up
    ///
    /// # Returns
    /// * `Ok(Account)` - The matching account
    /// * `Err(StoreError::NotFound)` - No row with this id exists
    /// * `Err(StoreError)` - The statement failed
    async fn find_by_id(
        &self,
        conn: &BoundConnection<Self::Conn>,
        id: &str,
    ) -> Result<Account, StoreError>;

    /// Overwrite the balance of an existing account row
    ///
    /// Updating an id that matches no row is not an error; the zero row
    /// count is logged and the call succeeds. There is no retry.
    ///
    /// # Arguments
    /// * `conn` - The bound connection to run the statement on
    /// * `id` - The account id to update
    /// * `balance` - The new balance
    async fn update_balance(
        &self,
        conn: &BoundConnection<Self::Conn>,
        id: &str,
        balance: i64,
    ) -> Result<(), StoreError>;

    /// Delete an account row
    ///
    /// Deleting an id that matches no row succeeds, so cleanup code can
    /// call this without checking existence first.
    ///
    /// # Arguments
    /// * `conn` - The bound connection to run the statement on
    /// * `id` - The account id to delete
    async fn delete(
        &self,
        conn: &BoundConnection<Self::Conn>,
        id: &str,
    ) -> Result<(), StoreError>;
}
