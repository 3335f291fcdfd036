//! Translation of raw SQLx errors into the core store error taxonomy.
//!
//! The repository implementations never leak `sqlx::Error`; every raw
//! error crossing into the repository contract goes through
//! [`MySqlErrorTranslator`] first, so callers match on semantic
//! categories instead of driver details.

use sqlx::error::{DatabaseError, ErrorKind};

use teller_core::errors::{ErrorTranslator, StoreError};

/// Maps SQLx errors onto [`StoreError`] categories for the MySQL
/// backend.
///
/// Classification uses the driver's own error kind first and falls back
/// to the SQLSTATE class: constraint violations (`23xxx`) become
/// [`StoreError::DuplicateKey`], syntax and access errors (`42xxx`)
/// become [`StoreError::Syntax`], transport problems become
/// [`StoreError::Connection`], and anything else is reported as
/// [`StoreError::Execution`].
#[derive(Debug, Default)]
pub struct MySqlErrorTranslator;

impl MySqlErrorTranslator {
    pub fn new() -> Self {
        Self
    }

    fn categorize(context: &str, db_err: &dyn DatabaseError) -> StoreError {
        if matches!(db_err.kind(), ErrorKind::UniqueViolation) {
            return StoreError::DuplicateKey {
                key: context.to_string(),
            };
        }
        match db_err.code().as_deref() {
            Some(code) if code.starts_with("23") => StoreError::DuplicateKey {
                key: context.to_string(),
            },
            Some(code) if code.starts_with("42") => StoreError::Syntax {
                message: format!("{}: {}", context, db_err.message()),
            },
            _ => StoreError::Execution {
                message: format!("{}: {}", context, db_err.message()),
            },
        }
    }
}

impl ErrorTranslator for MySqlErrorTranslator {
    type Raw = sqlx::Error;

    fn translate(&self, context: &str, raw: sqlx::Error) -> StoreError {
        match raw {
            sqlx::Error::Database(db_err) => Self::categorize(context, db_err.as_ref()),
            sqlx::Error::RowNotFound => StoreError::NotFound {
                id: context.to_string(),
            },
            sqlx::Error::Io(e) => StoreError::Connection {
                message: format!("{}: {}", context, e),
            },
            sqlx::Error::Protocol(message) => StoreError::Connection {
                message: format!("{}: {}", context, message),
            },
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => StoreError::Connection {
                message: format!("{}: connection pool unavailable", context),
            },
            other => StoreError::Execution {
                message: format!("{}: {}", context, other),
            },
        }
    }
}
