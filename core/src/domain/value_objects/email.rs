//! Normalized email address value object.

use serde::{Deserialize, Serialize};
use std::fmt;
use vm_shared::utils::validation::{is_valid_email, mask_email, normalize_email};

use crate::errors::ValidationError;

/// A syntactically valid, normalized email address.
///
/// Normalization trims surrounding whitespace and lowercases the whole
/// address. Every record and identity lookup is keyed by this form, so two
/// spellings that differ only in case always resolve to the same record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Parse and normalize user input
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let normalized = normalize_email(raw);
        if normalized.is_empty() {
            return Err(ValidationError::RequiredField {
                field: "email".to_string(),
            });
        }
        if !is_valid_email(&normalized) {
            return Err(ValidationError::InvalidEmail);
        }
        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Form safe to write to logs
    pub fn masked(&self) -> String {
        mask_email(&self.0)
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl TryFrom<String> for EmailAddress {
    type Error = ValidationError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        Self::parse(&raw)
    }
}

impl From<EmailAddress> for String {
    fn from(email: EmailAddress) -> Self {
        email.0
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for EmailAddress {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_normalizes_case_and_whitespace() {
        let email = EmailAddress::parse("  Alice@Example.COM ").unwrap();
        assert_eq!(email.as_str(), "alice@example.com");
        assert_eq!(email, EmailAddress::parse("alice@example.com").unwrap());
    }

    #[test]
    fn test_parse_rejects_empty() {
        assert_eq!(
            EmailAddress::parse("   "),
            Err(ValidationError::RequiredField {
                field: "email".to_string()
            })
        );
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert_eq!(EmailAddress::parse("not-an-email"), Err(ValidationError::InvalidEmail));
        assert_eq!(EmailAddress::parse("a@b"), Err(ValidationError::InvalidEmail));
    }

    #[test]
    fn test_deserialize_goes_through_parse() {
        let email: EmailAddress = serde_json::from_str("\" Carol@Example.com\"").unwrap();
        assert_eq!(email.as_str(), "carol@example.com");

        assert!(serde_json::from_str::<EmailAddress>("\"not-an-email\"").is_err());
        assert!(serde_json::from_str::<EmailAddress>("\"\"").is_err());
    }

    #[test]
    fn test_serialize_as_plain_string() {
        let email = EmailAddress::parse("dave@example.com").unwrap();
        assert_eq!(serde_json::to_string(&email).unwrap(), "\"dave@example.com\"");
    }

    #[test]
    fn test_masked() {
        let email = EmailAddress::parse("bob@example.com").unwrap();
        assert_eq!(email.masked(), "b***@example.com");
    }
}
