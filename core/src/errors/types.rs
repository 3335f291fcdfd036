//! Error types for connection acquisition, record storage, and transfers.
//!
//! Each stage of an operation has its own error type so callers can tell
//! a failure to start (no connection) apart from a failure mid-flight
//! (statement rejected, record missing) and from a business rejection.

use std::time::Duration;

use thiserror::Error;

/// Errors raised while obtaining a connection from a [`ConnectionSource`].
///
/// These occur before any statement runs, so there is never anything to
/// roll back when one of them is returned.
///
/// [`ConnectionSource`]: crate::transaction::ConnectionSource
#[derive(Error, Debug)]
pub enum AcquireError {
    #[error("No connection available: {reason}")]
    Unavailable { reason: String },

    #[error("Timed out waiting for a connection after {waited:?}")]
    Timeout { waited: Duration },

    #[error("Acquired connection could not enter transaction mode")]
    Unusable {
        #[source]
        source: StoreError,
    },
}

/// Errors raised by record-store operations against a bound connection.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Record not found: {id}")]
    NotFound { id: String },

    #[error("Duplicate key: {key}")]
    DuplicateKey { key: String },

    #[error("Statement rejected: {message}")]
    Syntax { message: String },

    #[error("Connection failure: {message}")]
    Connection { message: String },

    #[error("Statement execution failed: {message}")]
    Execution { message: String },

    #[error("Transaction already {outcome}")]
    AlreadyCompleted { outcome: &'static str },

    #[error("Connection handle is no longer bound to an operation")]
    Unbound,
}

impl From<AcquireError> for StoreError {
    /// Collapses an acquisition failure into the store's error channel.
    ///
    /// Only the standalone (auto-commit) access path uses this; the
    /// transactional path keeps acquisition failures separate so callers
    /// can tell "failed before start" apart from "rolled back".
    fn from(err: AcquireError) -> Self {
        StoreError::Connection {
            message: err.to_string(),
        }
    }
}

/// Business-rule rejections raised between the debit and the credit.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Account is frozen: {id}")]
    AccountFrozen { id: String },
}

/// Failure of the transfer business sequence.
#[derive(Error, Debug)]
pub enum TransferError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// The configured operation deadline elapsed before the business steps
/// finished. Used as the rollback cause on timed-out operations.
#[derive(Error, Debug)]
#[error("Operation exceeded its deadline of {limit:?}")]
pub struct DeadlineExceeded {
    pub limit: Duration,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn acquire_error_converts_to_connection_failure() {
        let err = AcquireError::Unavailable {
            reason: "pool exhausted".to_string(),
        };
        let store: StoreError = err.into();
        match store {
            StoreError::Connection { message } => {
                assert!(message.contains("pool exhausted"));
            }
            other => panic!("expected Connection, got {:?}", other),
        }
    }

    #[test]
    fn transfer_error_wraps_validation_transparently() {
        let err: TransferError = ValidationError::AccountFrozen {
            id: "acc-9".to_string(),
        }
        .into();
        assert_eq!(err.to_string(), "Account is frozen: acc-9");
    }

    #[test]
    fn unusable_keeps_the_underlying_store_error() {
        let err = AcquireError::Unusable {
            source: StoreError::Execution {
                message: "SET autocommit failed".to_string(),
            },
        };
        let source = std::error::Error::source(&err);
        assert!(source.is_some());
    }

    #[test]
    fn deadline_display_includes_the_limit() {
        let err = DeadlineExceeded {
            limit: Duration::from_secs(5),
        };
        assert!(err.to_string().contains("5s"));
    }
}
