//! Connection binding shared by every step of one operation.

use std::sync::Arc;

use tokio::sync::{Mutex, MutexGuard};

use crate::errors::StoreError;

/// Handle to the single physical connection bound to one in-flight
/// operation.
///
/// Clones are cheap and all refer to the same connection, which is what
/// keeps connection identity stable across nested calls; [`same_as`]
/// makes the identity observable. When the operation ends the binding is
/// emptied, and any handle still held observes [`StoreError::Unbound`].
///
/// [`same_as`]: BoundConnection::same_as
pub struct BoundConnection<C> {
    slot: Arc<Mutex<Option<C>>>,
}

impl<C> Clone for BoundConnection<C> {
    fn clone(&self) -> Self {
        Self {
            slot: Arc::clone(&self.slot),
        }
    }
}

impl<C> BoundConnection<C> {
    pub(crate) fn bind(conn: C) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Some(conn))),
        }
    }

    /// Locks the binding for the duration of one statement.
    pub async fn lease(&self) -> ConnectionLease<'_, C> {
        ConnectionLease {
            slot: self.slot.lock().await,
        }
    }

    /// Whether two handles refer to the same bound connection.
    pub fn same_as(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.slot, &other.slot)
    }

    /// Whether the binding still holds a connection.
    pub async fn is_bound(&self) -> bool {
        self.slot.lock().await.is_some()
    }

    pub(crate) async fn unbind(&self) -> Option<C> {
        self.slot.lock().await.take()
    }
}

impl<C> std::fmt::Debug for BoundConnection<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoundConnection").finish_non_exhaustive()
    }
}

/// Exclusive access to the bound connection while one statement runs.
pub struct ConnectionLease<'a, C> {
    slot: MutexGuard<'a, Option<C>>,
}

impl<'a, C> ConnectionLease<'a, C> {
    /// The connection, or [`StoreError::Unbound`] once the operation has
    /// ended.
    pub fn get_mut(&mut self) -> Result<&mut C, StoreError> {
        self.slot.as_mut().ok_or(StoreError::Unbound)
    }
}
