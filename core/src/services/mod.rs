//! Business services containing domain logic and use cases.

pub mod verification;

// Re-export commonly used types
pub use verification::{
    Clock, CodeDispatch, CodeGenerator, DispatchOutcome, Notifier, OsRngCodeGenerator,
    SystemClock, VerificationService, VerificationServiceConfig, VerifiedIdentity,
};
