//! Transaction machinery: connection binding, context, and coordination.
//!
//! One logical operation binds exactly one connection, runs its store
//! calls against it, and commits or rolls back exactly once at the
//! operation boundary. [`TransactionContext`] owns the binding and the
//! release; [`TransactionCoordinator`] drives the whole contract for the
//! managed, templated, and transparent styles, while manual callers
//! sequence the context primitives themselves.

mod binding;
mod context;
mod coordinator;
mod source;

pub use binding::{BoundConnection, ConnectionLease};
pub use context::TransactionContext;
pub use coordinator::TransactionCoordinator;
pub use source::{ConnectionSource, TransactionalConnection};

pub mod mock;
pub use mock::{MockConnection, MockConnectionSource};

#[cfg(test)]
mod tests;
