//! Domain entities representing core business objects.

pub mod identity;
pub mod verification_record;


// Re-export commonly used types
pub use identity::{Credential, Identity, NewIdentity, PendingRegistration, MAX_DISPLAY_NAME_LENGTH};
pub use verification_record::VerificationRecord;
