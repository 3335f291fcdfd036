//! Error types for the transactional data-access layer.

mod translate;
mod types;

// Re-export all error types and the translation contract
pub use translate::ErrorTranslator;
pub use types::{
    AcquireError, DeadlineExceeded, StoreError, TransferError, ValidationError,
};

use thiserror::Error;

/// Outcome of a coordinated operation that did not commit.
///
/// This is the only error type callers of a transactional operation see.
/// It keeps the tri-state outcome explicit: an operation either committed
/// (`Ok`), rolled back after starting (`RolledBack`), or never started
/// (`Acquire`).
#[derive(Error, Debug)]
pub enum OperationError {
    /// No transaction was started; nothing was written and nothing had to
    /// be rolled back.
    #[error(transparent)]
    Acquire(#[from] AcquireError),

    /// The operation started, failed, and all of its writes were undone.
    #[error("Operation rolled back: {cause}")]
    RolledBack {
        #[source]
        cause: Box<dyn std::error::Error + Send + Sync + 'static>,
    },

    /// The rollback statement itself failed; the connection was still
    /// released, but the database outcome is unknown.
    #[error("Rollback failed")]
    RollbackFailed {
        #[source]
        source: StoreError,
    },
}

impl OperationError {
    /// The failure that forced the rollback, when the operation got far
    /// enough to need one.
    pub fn rollback_cause(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            OperationError::RolledBack { cause } => Some(cause.as_ref()),
            _ => None,
        }
    }
}

pub type OperationResult<T> = Result<T, OperationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rollback_cause_downcasts_to_the_original_error() {
        let err = OperationError::RolledBack {
            cause: Box::new(TransferError::Validation(
                ValidationError::AccountFrozen {
                    id: "acc-2".to_string(),
                },
            )),
        };

        let cause = err.rollback_cause().expect("cause should be present");
        let transfer = cause
            .downcast_ref::<TransferError>()
            .expect("cause should be a TransferError");
        assert!(matches!(
            transfer,
            TransferError::Validation(ValidationError::AccountFrozen { .. })
        ));
    }

    #[test]
    fn acquire_failures_pass_through_transparently() {
        let err: OperationError = AcquireError::Unavailable {
            reason: "closed".to_string(),
        }
        .into();
        assert_eq!(err.to_string(), "No connection available: closed");
        assert!(err.rollback_cause().is_none());
    }
}
