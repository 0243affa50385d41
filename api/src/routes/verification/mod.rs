//! Verification route handlers
//!
//! - `POST /verification/request-code` mints (or resends) a code
//! - `POST /verification/resend-code` explicit resend, same policy
//! - `POST /verification/submit-code` consumes a code and registers the identity

use actix_web::{web, HttpRequest};

pub mod request_code;
pub mod resend_code;
pub mod submit_code;

pub use request_code::request_code;
pub use resend_code::resend_code;
pub use submit_code::submit_code;

/// Register the verification routes under the current scope
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/verification")
            .route("/request-code", web::post().to(request_code))
            .route("/resend-code", web::post().to(resend_code))
            .route("/submit-code", web::post().to(submit_code)),
    );
}

/// Extract client IP address from request, for log context
pub(crate) fn extract_client_ip(req: &HttpRequest) -> String {
    // X-Forwarded-For first (reverse proxy), then X-Real-IP
    if let Some(forwarded_for) = req.headers().get("X-Forwarded-For") {
        if let Ok(forwarded_str) = forwarded_for.to_str() {
            if let Some(ip) = forwarded_str.split(',').next() {
                return ip.trim().to_string();
            }
        }
    }

    if let Some(real_ip) = req.headers().get("X-Real-IP") {
        if let Ok(ip_str) = real_ip.to_str() {
            return ip_str.to_string();
        }
    }

    req.connection_info()
        .peer_addr()
        .unwrap_or("unknown")
        .to_string()
}
