//! # Teller Core
//!
//! Core domain and transaction layer for the Teller data-access
//! demonstrator. This crate contains the account entity, the connection
//! binding and transaction coordination machinery, repository
//! interfaces, the transfer business logic, and the error types that
//! tie them together.
//!
//! One logical operation acquires one connection, binds it, runs all of
//! its store calls on it, and commits or rolls back exactly once at the
//! operation boundary. The `transaction` module owns that contract; the
//! `services` module shows it driven in the manual, managed, templated,
//! and transparent styles.

pub mod domain;
pub mod errors;
pub mod repositories;
pub mod services;
pub mod transaction;

// Re-export commonly used types for convenience
pub use domain::*;
pub use errors::*;
pub use repositories::*;
pub use services::*;
pub use transaction::*;
