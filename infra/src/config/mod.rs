//! Configuration management for infrastructure services
//!
//! Handles database connection settings, loaded from defaults, an
//! optional configuration file, and `TELLER_DATABASE_*` environment
//! variables.

pub mod database;

pub use database::DatabaseConfig;
