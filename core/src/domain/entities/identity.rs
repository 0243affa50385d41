//! Registered identity entity and the inputs used to create one.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::domain::value_objects::EmailAddress;
use crate::errors::ValidationError;

/// Longest accepted display name, in characters
pub const MAX_DISPLAY_NAME_LENGTH: usize = 100;

/// A registered identity whose email ownership has been proven
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Unique identifier for the identity
    pub id: Uuid,

    /// Verified, normalized email address
    pub email: EmailAddress,

    /// Name chosen at registration
    pub display_name: String,

    /// Timestamp when the identity was created
    pub created_at: DateTime<Utc>,
}

/// Opaque credential material supplied at registration.
///
/// Hashing and storage policy belong to the identity store; this type only
/// keeps the value out of logs and debug output.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        if value.is_empty() {
            return Err(ValidationError::RequiredField {
                field: "credential".to_string(),
            });
        }
        Ok(Self(value))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

/// Registration data supplied alongside a code submission.
///
/// Transient: consumed once to build a [`NewIdentity`] and never stored.
#[derive(Debug, Clone)]
pub struct PendingRegistration {
    pub display_name: String,
    pub credential: Credential,
}

impl PendingRegistration {
    /// Validate raw registration input
    pub fn new(display_name: &str, credential: &str) -> Result<Self, ValidationError> {
        let display_name = display_name.trim();
        if display_name.is_empty() {
            return Err(ValidationError::RequiredField {
                field: "name".to_string(),
            });
        }
        if display_name.chars().count() > MAX_DISPLAY_NAME_LENGTH {
            return Err(ValidationError::InvalidFormat {
                field: "name".to_string(),
            });
        }

        Ok(Self {
            display_name: display_name.to_string(),
            credential: Credential::new(credential)?,
        })
    }
}

/// Everything an identity store needs to create an identity
#[derive(Debug, Clone)]
pub struct NewIdentity {
    pub email: EmailAddress,
    pub display_name: String,
    pub credential: Credential,
}

impl NewIdentity {
    pub fn from_registration(email: EmailAddress, registration: PendingRegistration) -> Self {
        Self {
            email,
            display_name: registration.display_name,
            credential: registration.credential,
        }
    }

    /// Build the identity this input describes, with a fresh id
    pub fn into_identity(self, created_at: DateTime<Utc>) -> Identity {
        Identity {
            id: Uuid::new_v4(),
            email: self.email,
            display_name: self.display_name,
            created_at,
        }
    }
}
