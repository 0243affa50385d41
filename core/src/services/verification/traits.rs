//! Traits for the collaborators the verification service depends on

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::value_objects::EmailAddress;
use crate::errors::NotifyError;

/// Out-of-band delivery of a verification code
///
/// Treated as fallible and slow: the service wraps every call in a deadline
/// and never rolls back a persisted record when delivery fails.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver `code` to `email`
    async fn deliver(&self, email: &EmailAddress, code: &str) -> Result<(), NotifyError>;
}

/// Source of the current time
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Source of fresh verification codes
pub trait CodeGenerator: Send + Sync {
    /// Produce a six-digit code, uniformly distributed
    fn generate(&self) -> String;
}
