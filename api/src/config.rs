//! Layered configuration loading for the API binary
//!
//! Sources, later ones winning:
//! 1. built-in defaults (`AppConfig::default()`)
//! 2. `config/{environment}.toml`, if present
//! 3. `VERIMAIL__SECTION__KEY` environment variables,
//!    e.g. `VERIMAIL__VERIFICATION__RATE_LIMIT_WINDOW_SECONDS=600`

use config::{Config, ConfigError, File, Map};

use vm_shared::config::{AppConfig, Environment};

/// Prefix of configuration environment variables
pub const ENV_PREFIX: &str = "VERIMAIL";

/// Load configuration for the environment named by `ENVIRONMENT`
pub fn load() -> Result<AppConfig, ConfigError> {
    load_with(Environment::from_env(), None)
}

/// Load configuration for `environment`
///
/// `overrides` replaces the process environment as the source of
/// `VERIMAIL__*` variables when given.
pub fn load_with(
    environment: Environment,
    overrides: Option<Map<String, String>>,
) -> Result<AppConfig, ConfigError> {
    let defaults = AppConfig {
        environment,
        ..AppConfig::default()
    };

    let env_source = config::Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
        .list_separator(",")
        .with_list_parse_key("server.allowed_origins")
        .source(overrides);

    let settings = Config::builder()
        .add_source(Config::try_from(&defaults)?)
        .add_source(File::with_name(environment.config_file()).required(false))
        .add_source(env_source)
        .build()?;

    settings.try_deserialize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use vm_shared::config::{EmailProvider, RecordRetention, StoreBackend};

    fn vars(pairs: &[(&str, &str)]) -> Option<Map<String, String>> {
        Some(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[test]
    fn test_defaults_without_overrides() {
        let config = load_with(Environment::Development, vars(&[])).unwrap();

        assert_eq!(config.environment, Environment::Development);
        assert_eq!(config.verification.rate_limit_window_seconds, 300);
        assert_eq!(config.verification.validity_window_seconds, 300);
        assert_eq!(config.verification.retention, RecordRetention::Consume);
        assert_eq!(config.email.provider, EmailProvider::Log);
    }

    #[test]
    fn test_environment_variables_override_defaults() {
        let config = load_with(
            Environment::Development,
            vars(&[
                ("VERIMAIL__VERIFICATION__VALIDITY_WINDOW_SECONDS", "600"),
                ("VERIMAIL__VERIFICATION__RETENTION", "retain"),
                ("VERIMAIL__VERIFICATION__STORE_BACKEND", "memory"),
                ("VERIMAIL__SERVER__PORT", "9090"),
                (
                    "VERIMAIL__SERVER__ALLOWED_ORIGINS",
                    "https://a.example.com,https://b.example.com",
                ),
            ]),
        )
        .unwrap();

        assert_eq!(config.verification.validity_window_seconds, 600);
        assert_eq!(config.verification.retention, RecordRetention::Retain);
        assert_eq!(config.verification.store_backend, StoreBackend::Memory);
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.server.allowed_origins.len(), 2);
    }

    #[test]
    fn test_invalid_value_is_an_error() {
        let result = load_with(
            Environment::Development,
            vars(&[("VERIMAIL__SERVER__PORT", "not-a-port")]),
        );
        assert!(result.is_err());
    }
}
