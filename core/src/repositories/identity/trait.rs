//! Identity repository trait defining the interface for registered identity
//! persistence.

use async_trait::async_trait;

use crate::domain::entities::{Identity, NewIdentity};
use crate::domain::value_objects::EmailAddress;
use crate::errors::DomainError;

/// Repository trait for registered identities
///
/// Implementations own email uniqueness: two `create` calls for the same
/// email must never both succeed, even when issued concurrently.
#[async_trait]
pub trait IdentityRepository: Send + Sync {
    /// Create a new identity
    ///
    /// # Returns
    /// * `Ok(Identity)` - The created identity (credential material is not echoed)
    /// * `Err(DomainError::Verification(VerificationError::DuplicateIdentity))` -
    ///   An identity with this email already exists
    /// * `Err(DomainError::Store)` - The backing store failed
    async fn create(&self, identity: NewIdentity) -> Result<Identity, DomainError>;

    /// Find an identity by its email address
    async fn find_by_email(&self, email: &EmailAddress) -> Result<Option<Identity>, DomainError>;

    /// Check whether an identity exists for an email address
    async fn exists_by_email(&self, email: &EmailAddress) -> Result<bool, DomainError> {
        Ok(self.find_by_email(email).await?.is_some())
    }
}
