//! Unit tests for domain error types

use crate::errors::{DomainError, NotifyError, ValidationError, VerificationError};
use vm_shared::error_codes;

#[test]
fn test_rate_limited_message_carries_minutes() {
    let error = VerificationError::RateLimited {
        retry_after_minutes: 4,
        retry_after_seconds: 240,
    };
    assert!(error.to_string().contains("4 minutes"));
}

#[test]
fn test_error_codes_are_distinct_for_invalid_and_expired() {
    let invalid: DomainError = VerificationError::InvalidCode.into();
    let expired: DomainError = VerificationError::CodeExpired.into();

    assert_eq!(invalid.error_code(), error_codes::VERIFICATION_CODE_INVALID);
    assert_eq!(expired.error_code(), error_codes::VERIFICATION_CODE_EXPIRED);
}

#[test]
fn test_validation_error_conversion() {
    let error: DomainError = ValidationError::RequiredField {
        field: "email".to_string(),
    }
    .into();

    assert!(matches!(error, DomainError::Validation(_)));
    assert_eq!(error.error_code(), error_codes::VALIDATION_ERROR);
    assert!(error.to_string().contains("email"));
}

#[test]
fn test_invalid_email_has_own_code() {
    let error: DomainError = ValidationError::InvalidEmail.into();
    assert_eq!(error.error_code(), error_codes::EMAIL_INVALID);
}

#[test]
fn test_infrastructure_classification() {
    assert!(DomainError::store("connection refused").is_infrastructure());
    assert!(DomainError::Timeout {
        operation: "find_by_email".to_string()
    }
    .is_infrastructure());
    assert!(!DomainError::from(VerificationError::DuplicateIdentity).is_infrastructure());
    assert_eq!(
        DomainError::store("boom").error_code(),
        error_codes::INTERNAL_ERROR
    );
}

#[test]
fn test_notify_error_display() {
    let error = NotifyError::Rejected("mailbox unavailable".to_string());
    assert_eq!(error.to_string(), "delivery rejected: mailbox unavailable");
}
