//! # Verimail Core
//!
//! Core business logic and domain layer for the Verimail backend.
//! This crate contains domain entities, the verification service,
//! repository interfaces, and error types.

pub mod domain;
pub mod errors;
pub mod repositories;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::{
    Credential, EmailAddress, Identity, NewIdentity, PendingRegistration, VerificationRecord,
};
pub use errors::{
    DomainError, DomainResult, NotifyError, ValidationError, VerificationError,
};
pub use repositories::{
    IdentityRepository, InMemoryIdentityRepository, InMemoryVerificationStore,
    VerificationRecordStore,
};
pub use services::{
    Clock, CodeDispatch, CodeGenerator, DispatchOutcome, Notifier, OsRngCodeGenerator,
    SystemClock, VerificationService, VerificationServiceConfig, VerifiedIdentity,
};

/// Test doubles for the clock, notifier and code generator
pub use services::verification::mock;
