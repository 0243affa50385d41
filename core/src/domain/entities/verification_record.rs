//! Verification record entity: the single per-email row tracking the current
//! code, its mint time and its expiration.

use chrono::{DateTime, Duration, Utc};
use constant_time_eq::constant_time_eq;
use std::fmt;

use crate::domain::value_objects::EmailAddress;

/// The one verification record kept per email address.
///
/// `expired_at` is always `created_at + validity window`; the two are only
/// ever set together by [`VerificationRecord::mint`]. A record's code is
/// never part of its `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct VerificationRecord {
    email: EmailAddress,
    code: String,
    created_at: DateTime<Utc>,
    expired_at: DateTime<Utc>,
}

impl VerificationRecord {
    /// Mint a fresh record for `email` at `now`
    pub fn mint(
        email: EmailAddress,
        code: String,
        now: DateTime<Utc>,
        validity_window: Duration,
    ) -> Self {
        Self {
            email,
            code,
            created_at: now,
            expired_at: now + validity_window,
        }
    }

    /// Rebuild a record read back from storage
    pub fn restore(
        email: EmailAddress,
        code: String,
        created_at: DateTime<Utc>,
        expired_at: DateTime<Utc>,
    ) -> Self {
        Self {
            email,
            code,
            created_at,
            expired_at,
        }
    }

    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// The raw code. Only the notifier and store adapters should need this.
    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn expired_at(&self) -> DateTime<Utc> {
        self.expired_at
    }

    /// Time since the last mint, clamped at zero so a record stamped by a
    /// replica with a clock slightly ahead of ours never looks older than it is.
    pub fn elapsed_since_mint(&self, now: DateTime<Utc>) -> Duration {
        let elapsed = now - self.created_at;
        if elapsed < Duration::zero() {
            Duration::zero()
        } else {
            elapsed
        }
    }

    /// Whether the code can still be submitted: `created_at <= now < expired_at`
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.created_at <= now && now < self.expired_at
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expired_at
    }

    /// Compare a submitted code in constant time
    pub fn matches_code(&self, submitted: &str) -> bool {
        constant_time_eq(self.code.as_bytes(), submitted.as_bytes())
    }
}

impl fmt::Debug for VerificationRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VerificationRecord")
            .field("email", &self.email.masked())
            .field("code", &"******")
            .field("created_at", &self.created_at)
            .field("expired_at", &self.expired_at)
            .finish()
    }
}
