//! Account entity representing a single ledger row.

use serde::{Deserialize, Serialize};

/// A ledger account holding a balance in minor currency units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Unique identifier for the account
    #[serde(rename = "account_id")]
    pub id: String,

    /// Current balance in minor currency units
    pub balance: i64,
}

impl Account {
    /// Creates a new Account with an opening balance
    pub fn new(id: impl Into<String>, balance: i64) -> Self {
        Self {
            id: id.into(),
            balance,
        }
    }

    /// Returns a copy of this account with the balance replaced
    pub fn with_balance(&self, balance: i64) -> Self {
        Self {
            id: self.id.clone(),
            balance,
        }
    }

    /// Checks whether the account can cover a withdrawal of `amount`
    pub fn can_cover(&self, amount: i64) -> bool {
        self.balance >= amount
    }
}
