//! Verification service module for email ownership verification
//!
//! This module provides the verification code lifecycle:
//! - Code minting, reuse and rate limiting keyed by email
//! - Code submission with expiration checks and identity creation
//! - The clock, code generator and notifier seams the service depends on

mod clock;
mod code_generator;
mod config;
pub mod mock;
mod service;
mod traits;
mod types;

#[cfg(test)]
mod tests;

pub use clock::SystemClock;
pub use code_generator::{OsRngCodeGenerator, CODE_MAX, CODE_MIN};
pub use config::VerificationServiceConfig;
pub use service::VerificationService;
pub use traits::{Clock, CodeGenerator, Notifier};
pub use types::{CodeDispatch, DispatchOutcome, VerifiedIdentity};
