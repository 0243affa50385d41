//! Configuration for the verification service

use chrono::Duration;
use vm_shared::config::{RecordRetention, VerificationConfig};

/// Configuration for the verification service
#[derive(Debug, Clone)]
pub struct VerificationServiceConfig {
    /// Minimum spacing between two mints for the same email
    pub rate_limit_window: Duration,
    /// How long a minted code may be submitted
    pub validity_window: Duration,
    /// What happens to a record after a successful submission
    pub retention: RecordRetention,
    /// Deadline for each store and identity repository call
    pub store_timeout: std::time::Duration,
    /// Deadline for each notifier call
    pub delivery_timeout: std::time::Duration,
    /// Re-reads allowed after losing a conditional write
    pub max_cas_retries: u32,
}

impl Default for VerificationServiceConfig {
    fn default() -> Self {
        Self::from(&VerificationConfig::default())
    }
}

impl From<&VerificationConfig> for VerificationServiceConfig {
    fn from(config: &VerificationConfig) -> Self {
        Self {
            rate_limit_window: Duration::seconds(config.rate_limit_window_seconds as i64),
            validity_window: Duration::seconds(config.validity_window_seconds as i64),
            retention: config.retention,
            store_timeout: config.store_timeout(),
            delivery_timeout: config.delivery_timeout(),
            max_cas_retries: config.max_cas_retries,
        }
    }
}
