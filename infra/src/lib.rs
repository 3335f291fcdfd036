//! # Infrastructure Layer
//!
//! This crate implements the infrastructure layer for the Teller data
//! access library. It provides the MySQL-backed implementations of the
//! connection and repository contracts defined in `teller_core`.
//!
//! ## Architecture
//!
//! The infrastructure layer contains:
//! - **Database**: connection sources, pool management, and the account
//!   repository, all built on SQLx with MySQL
//! - **Error translation**: mapping of raw SQLx errors onto the core
//!   store error taxonomy
//! - **Configuration**: database settings loaded from files and the
//!   environment
//!
//! The core crate never sees any of these concrete types; it works
//! against the `ConnectionSource`, `TransactionalConnection`, and
//! `AccountRepository` traits, and this crate plugs MySQL in underneath.

// Re-export core error types for convenience
pub use teller_core::errors::*;

/// Database module - MySQL implementations using SQLx
pub mod database;

/// Configuration module for infrastructure services
pub mod config;

/// Infrastructure-specific error types
#[derive(Debug, thiserror::Error)]
pub enum InfrastructureError {
    /// Database connection error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}
