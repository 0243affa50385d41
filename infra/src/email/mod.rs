//! Email Module
//!
//! Delivery of verification codes by email. Two notifiers are provided:
//!
//! - **HTTP**: a transactional email API (Brevo-compatible JSON payload)
//!   with retry and exponential backoff
//! - **Log**: writes the code to the application log, for development only

use std::sync::Arc;

use vm_core::Notifier;
use vm_shared::config::{EmailConfig, EmailProvider, Environment};

use crate::InfrastructureError;

pub mod http_email;
pub mod log_email;
pub mod message;

pub use http_email::HttpEmailNotifier;
pub use log_email::LogEmailNotifier;
pub use message::VerificationMessage;

#[cfg(test)]
mod tests;

/// Create the notifier selected by configuration
///
/// Unlike a silent fallback, a misconfigured provider is an error: the
/// service must not start believing codes are being mailed when they are not.
///
/// # Arguments
/// * `config` - Email configuration
/// * `environment` - Runtime environment; the log provider is refused in production
/// * `validity` - How long a delivered code stays valid, quoted in the message
pub fn create_notifier(
    config: &EmailConfig,
    environment: Environment,
    validity: chrono::Duration,
) -> Result<Arc<dyn Notifier>, InfrastructureError> {
    match config.provider {
        EmailProvider::Http => {
            let notifier = HttpEmailNotifier::new(config.clone(), validity)?;
            Ok(Arc::new(notifier))
        }
        EmailProvider::Log => {
            if environment.is_production() {
                return Err(InfrastructureError::Config(
                    "the log email provider cannot be used in production".to_string(),
                ));
            }
            tracing::warn!("Using log email provider; codes are written to the log");
            Ok(Arc::new(LogEmailNotifier::new()))
        }
    }
}
