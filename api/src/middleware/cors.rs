//! CORS middleware configuration for cross-origin requests.
//!
//! The configuration is environment-aware: permissive in development,
//! restricted to the configured origins everywhere else.

use actix_cors::Cors;
use actix_web::http::{header, Method};
use vm_shared::config::{Environment, ServerConfig};

/// Max age for preflight cache, in seconds
const PREFLIGHT_MAX_AGE: usize = 3600;

/// Creates a CORS middleware instance for the given environment.
///
/// Outside development only `server.allowed_origins` are accepted; with
/// none configured, cross-origin browser calls are refused.
pub fn create_cors(server: &ServerConfig, environment: Environment) -> Cors {
    if environment.is_development() && server.allowed_origins.is_empty() {
        create_development_cors()
    } else {
        create_restricted_cors(&server.allowed_origins)
    }
}

fn create_development_cors() -> Cors {
    log::info!("Configuring permissive CORS for development environment");

    Cors::default()
        .allow_any_origin()
        .allowed_methods(vec![Method::GET, Method::POST, Method::OPTIONS])
        .allowed_headers(vec![
            header::ACCEPT,
            header::CONTENT_TYPE,
            header::ORIGIN,
            header::USER_AGENT,
            header::HeaderName::from_static("x-requested-with"),
        ])
        .expose_headers(vec![header::RETRY_AFTER])
        .max_age(PREFLIGHT_MAX_AGE)
}

fn create_restricted_cors(allowed_origins: &[String]) -> Cors {
    let mut cors = Cors::default()
        .allowed_methods(vec![Method::GET, Method::POST, Method::OPTIONS])
        .allowed_headers(vec![header::ACCEPT, header::CONTENT_TYPE])
        .expose_headers(vec![header::RETRY_AFTER])
        .max_age(PREFLIGHT_MAX_AGE);

    for origin in allowed_origins.iter().map(|s| s.trim()) {
        if !origin.is_empty() {
            log::info!("Adding allowed origin: {}", origin);
            cors = cors.allowed_origin(origin);
        }
    }

    cors
}
