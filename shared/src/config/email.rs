//! Email delivery configuration module

use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Email delivery provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EmailProvider {
    /// Transactional email HTTP API
    Http,
    /// Write codes to the application log (development only)
    Log,
}

impl Default for EmailProvider {
    fn default() -> Self {
        EmailProvider::Log
    }
}

impl std::str::FromStr for EmailProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "http" | "api" => Ok(EmailProvider::Http),
            "log" | "mock" => Ok(EmailProvider::Log),
            _ => Err(format!("Invalid email provider: {}", s)),
        }
    }
}

/// Outbound email configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct EmailConfig {
    /// Delivery provider
    #[serde(default)]
    pub provider: EmailProvider,

    /// Endpoint of the transactional email API
    #[serde(default)]
    pub api_url: String,

    /// API key sent with every request
    #[serde(default)]
    pub api_key: String,

    /// Sender address
    #[serde(default)]
    pub sender_email: String,

    /// Sender display name
    #[serde(default)]
    pub sender_name: Option<String>,

    /// Subject line of the verification email
    #[serde(default = "default_subject")]
    pub subject: String,

    /// Timeout for a single HTTP request in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Retry attempts for failed deliveries
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Initial retry delay in milliseconds
    #[serde(default = "default_retry_delay")]
    pub retry_delay_ms: u64,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            provider: EmailProvider::default(),
            api_url: String::new(),
            api_key: String::new(),
            sender_email: String::new(),
            sender_name: None,
            subject: default_subject(),
            request_timeout_secs: default_request_timeout(),
            max_retries: default_max_retries(),
            retry_delay_ms: default_retry_delay(),
        }
    }
}

impl EmailConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            provider: std::env::var("EMAIL_PROVIDER")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.provider),
            api_url: std::env::var("EMAIL_API_URL").unwrap_or_default(),
            api_key: std::env::var("EMAIL_API_KEY").unwrap_or_default(),
            sender_email: std::env::var("EMAIL_SENDER").unwrap_or_default(),
            sender_name: std::env::var("EMAIL_SENDER_NAME").ok(),
            subject: std::env::var("EMAIL_SUBJECT").unwrap_or(defaults.subject),
            request_timeout_secs: std::env::var("EMAIL_REQUEST_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.request_timeout_secs),
            max_retries: std::env::var("EMAIL_MAX_RETRIES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_retries),
            retry_delay_ms: std::env::var("EMAIL_RETRY_DELAY_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.retry_delay_ms),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.provider != EmailProvider::Http {
            return Ok(());
        }
        if self.api_url.trim().is_empty() {
            return Err(ConfigError::new("email.api_url", "required for the http provider"));
        }
        if self.api_key.trim().is_empty() {
            return Err(ConfigError::new("email.api_key", "required for the http provider"));
        }
        if self.sender_email.trim().is_empty() {
            return Err(ConfigError::new(
                "email.sender_email",
                "required for the http provider",
            ));
        }
        Ok(())
    }
}

fn default_subject() -> String {
    "Your verification code".to_string()
}

fn default_request_timeout() -> u64 {
    10
}

fn default_max_retries() -> u32 {
    2
}

fn default_retry_delay() -> u64 {
    500
}
