//! Configuration module with business-specific sub-modules
//!
//! This module organizes configuration into logical areas:
//! - `cache` - Redis configuration
//! - `database` - Database connection and pool configuration
//! - `email` - Outbound email delivery configuration
//! - `environment` - Environment detection and logging configuration
//! - `server` - HTTP server configuration
//! - `verification` - Verification code windows, retention and timeouts

pub mod cache;
pub mod database;
pub mod email;
pub mod environment;
pub mod server;
pub mod verification;

use serde::{Deserialize, Serialize};
use std::fmt;

// Re-export commonly used types
pub use cache::CacheConfig;
pub use database::DatabaseConfig;
pub use email::{EmailConfig, EmailProvider};
pub use environment::{Environment, LogFormat, LoggingConfig};
pub use server::ServerConfig;
pub use verification::{RecordRetention, StoreBackend, VerificationConfig};

/// Complete application configuration combining all sub-configurations
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Environment configuration
    #[serde(default)]
    pub environment: Environment,

    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Database configuration
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Cache configuration
    #[serde(default)]
    pub cache: CacheConfig,

    /// Verification policy configuration
    #[serde(default)]
    pub verification: VerificationConfig,

    /// Email delivery configuration
    #[serde(default)]
    pub email: EmailConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        let env = Environment::default();
        Self {
            environment: env,
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            cache: CacheConfig::default(),
            verification: VerificationConfig::default(),
            email: EmailConfig::default(),
            logging: LoggingConfig::for_environment(env),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment
    pub fn from_env() -> Self {
        let environment = Environment::from_env();
        Self {
            environment,
            server: ServerConfig::from_env(),
            database: DatabaseConfig::from_env(),
            cache: CacheConfig::from_env(),
            verification: VerificationConfig::from_env(),
            email: EmailConfig::from_env(),
            logging: LoggingConfig::for_environment(environment),
        }
    }

    /// Check the configuration for values the server cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.verification.validate()?;
        self.email.validate()?;

        if self.environment.is_production() && self.email.provider == EmailProvider::Log {
            return Err(ConfigError::new(
                "email.provider",
                "the log provider prints codes and cannot be used in production",
            ));
        }
        if self.environment.is_production()
            && self.verification.store_backend == StoreBackend::Memory
        {
            return Err(ConfigError::new(
                "verification.store_backend",
                "the memory backend is process-local and cannot be used in production",
            ));
        }

        Ok(())
    }
}

/// A configuration value that failed validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    /// Dotted path of the offending key
    pub key: String,
    /// What is wrong with it
    pub reason: String,
}

impl ConfigError {
    pub fn new(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid configuration for `{}`: {}", self.key, self.reason)
    }
}

impl std::error::Error for ConfigError {}
