//! Domain-specific error types and error handling.

mod types;

#[cfg(test)]
mod tests;

// Re-export all error types
pub use types::{NotifyError, ValidationError, VerificationError};

use thiserror::Error;
use vm_shared::error_codes;

/// Core domain errors
///
/// This is the only error type that crosses the core boundary. Policy
/// rejections carry enough information to be shown to the caller verbatim;
/// `Store`, `Timeout` and `Internal` carry diagnostic detail that the
/// presentation layer must not echo back.
#[derive(Error, Debug)]
pub enum DomainError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Verification(#[from] VerificationError),

    #[error("Store error: {message}")]
    Store { message: String },

    #[error("Operation timed out: {operation}")]
    Timeout { operation: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl DomainError {
    /// Shorthand for a store failure
    pub fn store(message: impl Into<String>) -> Self {
        DomainError::Store {
            message: message.into(),
        }
    }

    /// Stable machine-readable code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            DomainError::Validation(ValidationError::InvalidEmail) => error_codes::EMAIL_INVALID,
            DomainError::Validation(_) => error_codes::VALIDATION_ERROR,
            DomainError::Verification(err) => err.error_code(),
            DomainError::Timeout { .. } => error_codes::UPSTREAM_TIMEOUT,
            DomainError::Store { .. } | DomainError::Internal { .. } => {
                error_codes::INTERNAL_ERROR
            }
        }
    }

    /// Whether this is an infrastructure failure rather than a policy decision
    pub fn is_infrastructure(&self) -> bool {
        matches!(
            self,
            DomainError::Store { .. } | DomainError::Timeout { .. } | DomainError::Internal { .. }
        )
    }
}

pub type DomainResult<T> = Result<T, DomainError>;
