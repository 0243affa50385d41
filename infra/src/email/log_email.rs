//! Development notifier that writes codes to the log instead of sending them

use async_trait::async_trait;

use vm_core::errors::NotifyError;
use vm_core::{EmailAddress, Notifier};

/// Notifier for local development
///
/// Never use in production: the code is logged in clear text.
#[derive(Debug, Clone, Default)]
pub struct LogEmailNotifier;

impl LogEmailNotifier {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Notifier for LogEmailNotifier {
    async fn deliver(&self, email: &EmailAddress, code: &str) -> Result<(), NotifyError> {
        tracing::warn!(
            event = "code_logged",
            email = %email.masked(),
            code = %code,
            "Verification code (log provider, not sent)"
        );
        Ok(())
    }
}
