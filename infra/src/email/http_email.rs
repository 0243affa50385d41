//! HTTP Email Notifier
//!
//! Sends verification codes through a transactional email HTTP API using a
//! Brevo-compatible JSON body and an `api-key` header.
//!
//! ## Retry behavior
//!
//! - 2xx: delivered
//! - 429 and 5xx, timeouts and connection errors: retried with exponential backoff
//! - any other status: rejected immediately, the address or payload is bad

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use vm_core::errors::NotifyError;
use vm_core::{EmailAddress, Notifier};
use vm_shared::config::EmailConfig;

use super::message::VerificationMessage;
use crate::InfrastructureError;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Mailbox {
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SendEmailBody {
    pub sender: Mailbox,
    pub to: Vec<Mailbox>,
    pub subject: String,
    pub text_content: String,
    pub html_content: String,
}

/// What to do with a response status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StatusClass {
    Delivered,
    Retry,
    Reject,
}

pub(crate) fn classify_status(status: StatusCode) -> StatusClass {
    if status.is_success() {
        StatusClass::Delivered
    } else if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
        StatusClass::Retry
    } else {
        StatusClass::Reject
    }
}

/// Email notifier backed by an HTTP API
pub struct HttpEmailNotifier {
    client: reqwest::Client,
    config: EmailConfig,
    validity: chrono::Duration,
}

impl HttpEmailNotifier {
    /// Create a new notifier
    ///
    /// # Arguments
    /// * `config` - Email configuration; must pass `validate()`
    /// * `validity` - Code validity window, quoted in the message body
    pub fn new(config: EmailConfig, validity: chrono::Duration) -> Result<Self, InfrastructureError> {
        config
            .validate()
            .map_err(|e| InfrastructureError::Config(e.to_string()))?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent(concat!("verimail/", env!("CARGO_PKG_VERSION")))
            .build()?;

        info!(
            "HTTP email notifier initialized with sender: {}",
            config.sender_email
        );

        Ok(Self {
            client,
            config,
            validity,
        })
    }

    pub(crate) fn build_body(&self, to: &EmailAddress, code: &str) -> SendEmailBody {
        let message = VerificationMessage::render(code, self.validity);
        SendEmailBody {
            sender: Mailbox {
                email: self.config.sender_email.clone(),
                name: self.config.sender_name.clone(),
            },
            to: vec![Mailbox {
                email: to.as_str().to_string(),
                name: None,
            }],
            subject: self.config.subject.clone(),
            text_content: message.text,
            html_content: message.html,
        }
    }

    /// Send with retry logic
    async fn send_with_retry(
        &self,
        to: &EmailAddress,
        body: &SendEmailBody,
    ) -> Result<(), NotifyError> {
        let attempts_allowed = self.config.max_retries + 1;
        let mut attempts = 0;
        let mut delay = Duration::from_millis(self.config.retry_delay_ms);

        loop {
            attempts += 1;

            debug!(
                "Sending email attempt {}/{} to {}",
                attempts,
                attempts_allowed,
                to.masked()
            );

            let result = self
                .client
                .post(&self.config.api_url)
                .header("api-key", &self.config.api_key)
                .header("Accept", "application/json")
                .json(body)
                .send()
                .await;

            let failure = match result {
                Ok(response) => {
                    let status = response.status();
                    match classify_status(status) {
                        StatusClass::Delivered => {
                            info!("Email sent successfully to {}", to.masked());
                            return Ok(());
                        }
                        StatusClass::Reject => {
                            let detail = response.text().await.unwrap_or_default();
                            error!(
                                "Email provider rejected message to {} (status={}): {}",
                                to.masked(),
                                status,
                                detail
                            );
                            return Err(NotifyError::Rejected(format!("status {}", status)));
                        }
                        StatusClass::Retry => format!("status {}", status),
                    }
                }
                Err(e) => e.to_string(),
            };

            error!(
                "Failed to send email (attempt {}/{}): {}",
                attempts, attempts_allowed, failure
            );

            if attempts >= attempts_allowed {
                return Err(NotifyError::Unavailable(format!(
                    "failed after {} attempts: {}",
                    attempts, failure
                )));
            }

            warn!("Retrying email delivery after {:?}", delay);
            tokio::time::sleep(delay).await;
            delay *= 2;
        }
    }
}

#[async_trait]
impl Notifier for HttpEmailNotifier {
    async fn deliver(&self, email: &EmailAddress, code: &str) -> Result<(), NotifyError> {
        let body = self.build_body(email, code);
        self.send_with_retry(email, &body).await
    }
}
