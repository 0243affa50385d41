//! Error type definitions for input validation, verification policy and
//! notification delivery.

use thiserror::Error;
use vm_shared::error_codes;

/// Input validation errors
///
/// Raised before any store or collaborator is touched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required field: {field}")]
    RequiredField { field: String },

    #[error("Invalid email address")]
    InvalidEmail,

    #[error("Invalid format: {field}")]
    InvalidFormat { field: String },
}

/// Verification policy outcomes that are reported to the caller as failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VerificationError {
    #[error("Too many requests. Please try again in {retry_after_minutes} minutes")]
    RateLimited {
        retry_after_minutes: u32,
        retry_after_seconds: u64,
    },

    /// No record matches the submitted email and code. Deliberately covers
    /// both "wrong code" and "no record".
    #[error("Invalid verification code")]
    InvalidCode,

    #[error("Verification code expired")]
    CodeExpired,

    /// The record was persisted but the notifier did not confirm delivery
    #[error("Verification email could not be delivered: {reason}")]
    DeliveryFailed { reason: String },

    #[error("An identity already exists for this email")]
    DuplicateIdentity,
}

impl VerificationError {
    pub fn error_code(&self) -> &'static str {
        match self {
            VerificationError::RateLimited { .. } => error_codes::RATE_LIMIT_EXCEEDED,
            VerificationError::InvalidCode => error_codes::VERIFICATION_CODE_INVALID,
            VerificationError::CodeExpired => error_codes::VERIFICATION_CODE_EXPIRED,
            VerificationError::DeliveryFailed { .. } => error_codes::DELIVERY_FAILED,
            VerificationError::DuplicateIdentity => error_codes::IDENTITY_EXISTS,
        }
    }
}

/// Failure reported by a notifier
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NotifyError {
    /// The provider refused the message (bad address, suppressed recipient, auth)
    #[error("delivery rejected: {0}")]
    Rejected(String),

    /// The provider could not be reached or kept failing after retries
    #[error("delivery unavailable: {0}")]
    Unavailable(String),
}
