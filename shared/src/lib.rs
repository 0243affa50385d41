//! Shared utilities and common types for the Verimail server
//!
//! This crate provides common functionality used across all server modules:
//! - Configuration types
//! - Error response structures
//! - Email validation, normalization and masking

pub mod config;
pub mod errors;
pub mod utils;

// Re-export commonly used items at crate root
pub use config::{
    AppConfig, CacheConfig, ConfigError, DatabaseConfig, EmailConfig, Environment, LoggingConfig,
    ServerConfig, VerificationConfig,
};
pub use errors::{error_codes, ErrorResponse};
pub use utils::validation;
