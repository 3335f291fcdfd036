//! Contract for mapping driver-level errors into store errors.

use super::types::StoreError;

/// Maps raw driver errors into the store's error contract.
///
/// Implementations inspect whatever structure the driver exposes (error
/// kinds, SQLSTATE codes) and produce the matching [`StoreError`]
/// variant. Translation happens exactly once, at the boundary where a
/// raw error would otherwise cross into a repository's public contract;
/// nothing above that boundary ever sees a driver error type.
pub trait ErrorTranslator {
    /// The driver error type this translator understands.
    type Raw;

    /// Translates `raw` into a [`StoreError`].
    ///
    /// `context` identifies what the failing statement was operating on,
    /// usually the record key; it ends up in error messages and in the
    /// key-carrying variants.
    fn translate(&self, context: &str, raw: Self::Raw) -> StoreError;
}
