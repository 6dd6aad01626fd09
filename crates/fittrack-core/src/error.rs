//! Domain error types.

use thiserror::Error;

/// Top-level domain error type.
///
/// Recording the same occurrence twice is an ordinary outcome and has no
/// variant here.
#[derive(Debug, Error)]
pub enum DomainError {
    /// A validation error in domain logic.
    #[error("validation error: {0}")]
    Validation(String),

    /// Persisted data could not be decoded into domain types.
    #[error("corrupt record: {0}")]
    CorruptRecord(String),

    /// An infrastructure/persistence error.
    #[error("infrastructure error: {0}")]
    Infrastructure(String),
}
