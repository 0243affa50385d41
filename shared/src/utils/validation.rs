//! Email and verification code validation utilities

use once_cell::sync::Lazy;
use regex::Regex;

/// Longest address accepted (RFC 5321 path limit)
pub const MAX_EMAIL_LENGTH: usize = 254;

/// Number of digits in a verification code
pub const CODE_LENGTH: usize = 6;

static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?(?:\.[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?)+$")
        .expect("email regex is valid")
});

/// Canonical form of an email address: trimmed and lowercased.
///
/// Every lookup keyed by email goes through this function so that
/// `Alice@Example.com` and `alice@example.com` name the same record.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Check whether an already-normalized address is acceptable
pub fn is_valid_email(email: &str) -> bool {
    !email.is_empty() && email.len() <= MAX_EMAIL_LENGTH && EMAIL_REGEX.is_match(email)
}

/// Check that a submitted code is exactly six ASCII digits
pub fn is_valid_code(code: &str) -> bool {
    code.len() == CODE_LENGTH && code.bytes().all(|b| b.is_ascii_digit())
}

/// Mask an email address for logging, keeping the first character of the
/// local part and the full domain: `alice@example.com` -> `a***@example.com`
pub fn mask_email(email: &str) -> String {
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() => {
            let first: String = local.chars().take(1).collect();
            format!("{}***@{}", first, domain)
        }
        _ => "***".to_string(),
    }
}
