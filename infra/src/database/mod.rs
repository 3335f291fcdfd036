//! Database module - MySQL implementations using SQLx
//!
//! This module provides the database access layer, including:
//! - Connection pool management
//! - Connection sources feeding the core transaction machinery
//! - The MySQL account repository
//! - Translation of SQLx errors into the core store error taxonomy

pub mod connection;
pub mod mysql;
pub mod translate;

#[cfg(test)]
mod tests;

// Re-export commonly used types
pub use connection::{
    DatabasePool, MySqlConnectionSource, MySqlDirectSource, MySqlSession, PoolStatistics,
};
pub use mysql::MySqlAccountRepository;
pub use translate::MySqlErrorTranslator;
