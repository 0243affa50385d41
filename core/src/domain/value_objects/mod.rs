//! Value objects representing immutable domain concepts.

pub mod email;

pub use email::EmailAddress;
