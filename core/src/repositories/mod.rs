//! Repository interfaces for verification records and registered identities,
//! with in-memory implementations for tests and single-process deployments.

pub mod identity;
pub mod verification;

pub use identity::{IdentityRepository, InMemoryIdentityRepository};
pub use verification::{InMemoryVerificationStore, VerificationRecordStore};
