//! Verification policy configuration module

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::ConfigError;

/// What happens to a verification record once its code has been accepted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordRetention {
    /// Delete the record after a successful verification; replays see an invalid code
    Consume,
    /// Keep the record until it expires; replays hit the identity uniqueness check
    Retain,
}

impl Default for RecordRetention {
    fn default() -> Self {
        RecordRetention::Consume
    }
}

impl std::str::FromStr for RecordRetention {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "consume" | "delete" => Ok(RecordRetention::Consume),
            "retain" | "keep" => Ok(RecordRetention::Retain),
            _ => Err(format!("Invalid retention policy: {}", s)),
        }
    }
}

/// Backing store for verification records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Redis,
    Mysql,
    Memory,
}

impl Default for StoreBackend {
    fn default() -> Self {
        StoreBackend::Redis
    }
}

impl std::str::FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "redis" => Ok(StoreBackend::Redis),
            "mysql" => Ok(StoreBackend::Mysql),
            "memory" | "in-memory" => Ok(StoreBackend::Memory),
            _ => Err(format!("Invalid store backend: {}", s)),
        }
    }
}

/// Verification code policy
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct VerificationConfig {
    /// Minimum spacing between two mints for the same email, in seconds
    #[serde(default = "default_rate_limit_window")]
    pub rate_limit_window_seconds: u64,

    /// How long a minted code can be submitted, in seconds
    #[serde(default = "default_validity_window")]
    pub validity_window_seconds: u64,

    /// Retention of a record after successful verification
    #[serde(default)]
    pub retention: RecordRetention,

    /// Deadline for a single record store call, in milliseconds
    #[serde(default = "default_store_timeout")]
    pub store_timeout_ms: u64,

    /// Deadline for a single email delivery, in milliseconds
    #[serde(default = "default_delivery_timeout")]
    pub delivery_timeout_ms: u64,

    /// Which store holds verification records
    #[serde(default)]
    pub store_backend: StoreBackend,

    /// How many times a mint re-reads after losing a conditional write
    #[serde(default = "default_max_cas_retries")]
    pub max_cas_retries: u32,
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self {
            rate_limit_window_seconds: default_rate_limit_window(),
            validity_window_seconds: default_validity_window(),
            retention: RecordRetention::default(),
            store_timeout_ms: default_store_timeout(),
            delivery_timeout_ms: default_delivery_timeout(),
            store_backend: StoreBackend::default(),
            max_cas_retries: default_max_cas_retries(),
        }
    }
}

impl VerificationConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            rate_limit_window_seconds: env_parse(
                "VERIFICATION_RATE_LIMIT_SECONDS",
                defaults.rate_limit_window_seconds,
            ),
            validity_window_seconds: env_parse(
                "VERIFICATION_VALIDITY_SECONDS",
                defaults.validity_window_seconds,
            ),
            retention: env_parse("VERIFICATION_RETENTION", defaults.retention),
            store_timeout_ms: env_parse("VERIFICATION_STORE_TIMEOUT_MS", defaults.store_timeout_ms),
            delivery_timeout_ms: env_parse(
                "VERIFICATION_DELIVERY_TIMEOUT_MS",
                defaults.delivery_timeout_ms,
            ),
            store_backend: env_parse("VERIFICATION_STORE_BACKEND", defaults.store_backend),
            max_cas_retries: env_parse("VERIFICATION_MAX_CAS_RETRIES", defaults.max_cas_retries),
        }
    }

    pub fn rate_limit_window(&self) -> Duration {
        Duration::from_secs(self.rate_limit_window_seconds)
    }

    pub fn validity_window(&self) -> Duration {
        Duration::from_secs(self.validity_window_seconds)
    }

    pub fn store_timeout(&self) -> Duration {
        Duration::from_millis(self.store_timeout_ms)
    }

    pub fn delivery_timeout(&self) -> Duration {
        Duration::from_millis(self.delivery_timeout_ms)
    }

    /// Longest time a record can still influence a decision
    pub fn record_ttl(&self) -> Duration {
        Duration::from_secs(
            self.rate_limit_window_seconds
                .max(self.validity_window_seconds),
        )
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rate_limit_window_seconds == 0 {
            return Err(ConfigError::new(
                "verification.rate_limit_window_seconds",
                "must be greater than zero",
            ));
        }
        if self.validity_window_seconds == 0 {
            return Err(ConfigError::new(
                "verification.validity_window_seconds",
                "must be greater than zero",
            ));
        }
        if self.store_timeout_ms == 0 || self.delivery_timeout_ms == 0 {
            return Err(ConfigError::new(
                "verification.timeouts",
                "store and delivery timeouts must be greater than zero",
            ));
        }
        Ok(())
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn default_rate_limit_window() -> u64 {
    300 // 5 minutes
}

fn default_validity_window() -> u64 {
    300 // 5 minutes
}

fn default_store_timeout() -> u64 {
    2000
}

fn default_delivery_timeout() -> u64 {
    10_000
}

fn default_max_cas_retries() -> u32 {
    3
}
