//! Types for verification service results

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::domain::value_objects::EmailAddress;

/// How a code request was satisfied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// A new code was minted and delivered
    Issued,
    /// The outstanding, still-valid code was delivered again
    Resent,
}

impl DispatchOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            DispatchOutcome::Issued => "issued",
            DispatchOutcome::Resent => "resent",
        }
    }
}

/// Result of a code request or resend. Never carries the code itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeDispatch {
    pub outcome: DispatchOutcome,
    /// When the delivered code stops being accepted
    pub expires_at: DateTime<Utc>,
    /// Earliest time a new code can be minted for this email
    pub next_request_at: DateTime<Utc>,
    /// `expires_at` relative to the time the request was evaluated
    pub expires_in: Duration,
    /// `next_request_at` relative to the time the request was evaluated
    pub retry_after: Duration,
}

/// Result of a successful code submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedIdentity {
    pub identity_id: Uuid,
    pub email: EmailAddress,
}
