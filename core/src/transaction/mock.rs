//! In-memory connection source and connection for testing

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::errors::{AcquireError, StoreError};

use super::source::{ConnectionSource, TransactionalConnection};

type Table = Arc<RwLock<HashMap<String, i64>>>;

/// Failure levers stamped onto every handed-out connection.
#[derive(Debug, Clone, Copy, Default)]
struct FailureModes {
    transaction_mode: bool,
    commit: bool,
    rollback: bool,
}

#[derive(Debug, Clone)]
enum StagedWrite {
    Upsert { id: String, balance: i64 },
    Delete { id: String },
}

/// In-memory stand-in for a database connection.
///
/// While auto-commit is off, writes are staged on the connection and
/// only reach the shared table on `commit`; `rollback` discards them.
/// While auto-commit is on, writes apply to the table immediately. Reads
/// see the connection's own staged writes, like a real session inside a
/// transaction.
#[derive(Debug)]
pub struct MockConnection {
    id: u64,
    table: Table,
    staged: Vec<StagedWrite>,
    auto_commit: bool,
    fail: FailureModes,
}

impl MockConnection {
    /// Identity of the underlying "physical" connection.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Whether the connection is currently in auto-commit mode.
    pub fn is_auto_commit(&self) -> bool {
        self.auto_commit
    }

    /// Number of writes staged and not yet committed.
    pub fn staged_writes(&self) -> usize {
        self.staged.len()
    }

    /// Balance visible to this connection, staged writes included.
    pub async fn select(&self, id: &str) -> Option<i64> {
        if let Some(view) = self.staged_view(id) {
            return view;
        }
        self.table.read().await.get(id).copied()
    }

    /// Inserts a new row; an existing row with the same id is a
    /// duplicate-key error.
    pub async fn insert(&mut self, id: &str, balance: i64) -> Result<(), StoreError> {
        if self.select(id).await.is_some() {
            return Err(StoreError::DuplicateKey {
                key: id.to_string(),
            });
        }
        self.write(StagedWrite::Upsert {
            id: id.to_string(),
            balance,
        })
        .await;
        Ok(())
    }

    /// Updates an existing row, reporting whether a row matched.
    pub async fn update(&mut self, id: &str, balance: i64) -> bool {
        if self.select(id).await.is_none() {
            return false;
        }
        self.write(StagedWrite::Upsert {
            id: id.to_string(),
            balance,
        })
        .await;
        true
    }

    /// Removes a row, reporting whether a row matched.
    pub async fn remove(&mut self, id: &str) -> bool {
        if self.select(id).await.is_none() {
            return false;
        }
        self.write(StagedWrite::Delete { id: id.to_string() }).await;
        true
    }

    // Last staged write wins; None means the row is deleted.
    fn staged_view(&self, id: &str) -> Option<Option<i64>> {
        self.staged.iter().rev().find_map(|write| match write {
            StagedWrite::Upsert { id: wid, balance } if wid == id => Some(Some(*balance)),
            StagedWrite::Delete { id: wid } if wid == id => Some(None),
            _ => None,
        })
    }

    async fn write(&mut self, write: StagedWrite) {
        if self.auto_commit {
            Self::apply(&self.table, std::slice::from_ref(&write)).await;
        } else {
            self.staged.push(write);
        }
    }

    async fn apply(table: &Table, writes: &[StagedWrite]) {
        let mut rows = table.write().await;
        for write in writes {
            match write {
                StagedWrite::Upsert { id, balance } => {
                    rows.insert(id.clone(), *balance);
                }
                StagedWrite::Delete { id } => {
                    rows.remove(id);
                }
            }
        }
    }
}

#[async_trait]
impl TransactionalConnection for MockConnection {
    async fn set_auto_commit(&mut self, enabled: bool) -> Result<(), StoreError> {
        if !enabled && self.fail.transaction_mode {
            return Err(StoreError::Execution {
                message: "transaction mode rejected".to_string(),
            });
        }
        if enabled && !self.staged.is_empty() {
            tracing::warn!(
                conn = self.id,
                staged = self.staged.len(),
                "restoring auto-commit discards staged writes"
            );
            self.staged.clear();
        }
        self.auto_commit = enabled;
        Ok(())
    }

    async fn commit(&mut self) -> Result<(), StoreError> {
        if self.fail.commit {
            return Err(StoreError::Execution {
                message: "commit refused".to_string(),
            });
        }
        let writes = std::mem::take(&mut self.staged);
        Self::apply(&self.table, &writes).await;
        Ok(())
    }

    async fn rollback(&mut self) -> Result<(), StoreError> {
        if self.fail.rollback {
            return Err(StoreError::Execution {
                message: "rollback refused".to_string(),
            });
        }
        self.staged.clear();
        Ok(())
    }
}

/// In-memory connection source backed by a shared table.
///
/// Tracks acquire/release accounting so tests can assert the release
/// guarantee, and can be capped to a fixed number of outstanding
/// connections to exercise exhaustion.
#[derive(Debug)]
pub struct MockConnectionSource {
    table: Table,
    capacity: Option<usize>,
    fail: FailureModes,
    next_conn_id: AtomicU64,
    acquired: AtomicUsize,
    released: AtomicUsize,
    outstanding: AtomicUsize,
    released_in_transaction: AtomicUsize,
}

impl MockConnectionSource {
    /// Create a new source with an empty table and no capacity limit
    pub fn new() -> Self {
        Self {
            table: Arc::new(RwLock::new(HashMap::new())),
            capacity: None,
            fail: FailureModes::default(),
            next_conn_id: AtomicU64::new(0),
            acquired: AtomicUsize::new(0),
            released: AtomicUsize::new(0),
            outstanding: AtomicUsize::new(0),
            released_in_transaction: AtomicUsize::new(0),
        }
    }

    /// Caps the number of simultaneously outstanding connections.
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = Some(capacity);
        self
    }

    /// Makes every handed-out connection refuse to enter transaction
    /// mode.
    pub fn with_broken_transaction_mode(mut self) -> Self {
        self.fail.transaction_mode = true;
        self
    }

    /// Makes `commit` fail on every handed-out connection.
    pub fn with_broken_commit(mut self) -> Self {
        self.fail.commit = true;
        self
    }

    /// Makes `rollback` fail on every handed-out connection.
    pub fn with_broken_rollback(mut self) -> Self {
        self.fail.rollback = true;
        self
    }

    /// Writes a row straight into the shared table.
    pub async fn seed(&self, id: &str, balance: i64) {
        self.table.write().await.insert(id.to_string(), balance);
    }

    /// Reads a row straight from the shared table (committed state
    /// only).
    pub async fn balance(&self, id: &str) -> Option<i64> {
        self.table.read().await.get(id).copied()
    }

    /// Total connections handed out so far.
    pub fn acquired_count(&self) -> usize {
        self.acquired.load(Ordering::SeqCst)
    }

    /// Total connections returned so far.
    pub fn released_count(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }

    /// Connections handed out and not yet returned.
    pub fn outstanding_count(&self) -> usize {
        self.outstanding.load(Ordering::SeqCst)
    }

    /// Connections returned while still out of auto-commit mode.
    pub fn released_in_transaction_count(&self) -> usize {
        self.released_in_transaction.load(Ordering::SeqCst)
    }
}

impl Default for MockConnectionSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ConnectionSource for MockConnectionSource {
    type Conn = MockConnection;

    async fn acquire(&self) -> Result<MockConnection, AcquireError> {
        if let Some(capacity) = self.capacity {
            if self.outstanding.load(Ordering::SeqCst) >= capacity {
                return Err(AcquireError::Unavailable {
                    reason: format!("all {} connections are in use", capacity),
                });
            }
        }
        self.outstanding.fetch_add(1, Ordering::SeqCst);
        self.acquired.fetch_add(1, Ordering::SeqCst);
        let id = self.next_conn_id.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::debug!(conn = id, "mock connection acquired");
        Ok(MockConnection {
            id,
            table: Arc::clone(&self.table),
            staged: Vec::new(),
            auto_commit: true,
            fail: self.fail,
        })
    }

    async fn release(&self, conn: MockConnection) {
        if !conn.auto_commit {
            self.released_in_transaction.fetch_add(1, Ordering::SeqCst);
            tracing::warn!(conn = conn.id, "connection returned while not in auto-commit mode");
        }
        if !conn.staged.is_empty() {
            tracing::warn!(
                conn = conn.id,
                staged = conn.staged.len(),
                "connection returned with staged writes; they are discarded"
            );
        }
        self.released.fetch_add(1, Ordering::SeqCst);
        self.outstanding.fetch_sub(1, Ordering::SeqCst);
        tracing::debug!(conn = conn.id, "mock connection released");
    }
}
