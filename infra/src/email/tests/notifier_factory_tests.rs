//! Tests for notifier selection and message rendering

use vm_shared::config::{EmailConfig, EmailProvider, Environment};

use crate::email::{create_notifier, VerificationMessage};
use crate::InfrastructureError;

#[test]
fn test_log_provider_in_development() {
    let config = EmailConfig::default();
    let notifier = create_notifier(&config, Environment::Development, chrono::Duration::minutes(5));
    assert!(notifier.is_ok());
}

#[test]
fn test_log_provider_refused_in_production() {
    let config = EmailConfig::default();
    let result = create_notifier(&config, Environment::Production, chrono::Duration::minutes(5));
    assert!(matches!(result, Err(InfrastructureError::Config(_))));
}

#[test]
fn test_http_provider_without_credentials_is_error() {
    let config = EmailConfig {
        provider: EmailProvider::Http,
        ..Default::default()
    };
    let result = create_notifier(&config, Environment::Staging, chrono::Duration::minutes(5));
    assert!(matches!(result, Err(InfrastructureError::Config(_))));
}

#[test]
fn test_message_quotes_code_and_validity() {
    let message = VerificationMessage::render("482913", chrono::Duration::minutes(5));
    assert!(message.text.contains("482913"));
    assert!(message.text.contains("5 minutes"));
    assert!(message.html.contains("482913"));

    let short = VerificationMessage::render("482913", chrono::Duration::seconds(30));
    assert!(short.text.contains("1 minute."));
}

#[tokio::test]
async fn test_log_notifier_always_succeeds() {
    use vm_core::{EmailAddress, Notifier};

    let notifier = crate::email::LogEmailNotifier::new();
    let email = EmailAddress::parse("dev@example.com").unwrap();
    assert!(notifier.deliver(&email, "123456").await.is_ok());
}
