//! Verification record store trait defining the persistence contract for the
//! one-record-per-email verification state.
//!
//! Besides the plain keyed operations, the trait exposes two conditional
//! writes. The verification service never performs a read-decide-write
//! sequence with the unconditional `upsert`; it uses `upsert_if` with the
//! `created_at` it read, so two replicas racing on the same email cannot both
//! mint. Implementations must make each conditional write atomic in the
//! backing store (a Lua script, a conditional `UPDATE`, a held lock).

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::entities::VerificationRecord;
use crate::domain::value_objects::EmailAddress;
use crate::errors::DomainError;

/// Keyed persistence for verification records
///
/// Timestamps are compared at millisecond precision; callers should
/// truncate `created_at` to milliseconds before writing.
#[async_trait]
pub trait VerificationRecordStore: Send + Sync {
    /// Find the record for an email address
    ///
    /// # Returns
    /// * `Ok(Some(record))` - A record exists
    /// * `Ok(None)` - No record exists
    /// * `Err(DomainError::Store)` - The backing store failed
    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<VerificationRecord>, DomainError>;

    /// Insert or replace the record keyed by its email, atomically
    async fn upsert(&self, record: &VerificationRecord) -> Result<(), DomainError>;

    /// Delete the record for an email
    ///
    /// Returns `true` if a record was removed.
    async fn delete(&self, email: &EmailAddress) -> Result<bool, DomainError>;

    /// Write `record` only if the stored record still has the expected state
    ///
    /// # Arguments
    /// * `record` - The record to write
    /// * `expected_created_at` - `None` to require that no record exists,
    ///   `Some(t)` to require that the stored record's `created_at` is `t`
    ///
    /// # Returns
    /// * `Ok(true)` - The write was applied
    /// * `Ok(false)` - Another writer got there first; nothing was written
    async fn upsert_if(
        &self,
        record: &VerificationRecord,
        expected_created_at: Option<DateTime<Utc>>,
    ) -> Result<bool, DomainError>;

    /// Delete the record only if its `created_at` still equals `expected_created_at`
    async fn delete_if(
        &self,
        email: &EmailAddress,
        expected_created_at: DateTime<Utc>,
    ) -> Result<bool, DomainError>;
}
