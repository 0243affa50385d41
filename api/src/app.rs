//! Application state and factory
//!
//! This module holds the shared state handed to every handler and the
//! factory that assembles the Actix-web application around it.

use std::sync::Arc;

use actix_web::{
    body::MessageBody,
    dev::{ServiceFactory, ServiceRequest, ServiceResponse},
    middleware::Logger,
    web, App, HttpResponse,
};

use vm_core::{IdentityRepository, Notifier, VerificationRecordStore, VerificationService};
use vm_shared::config::{Environment, ServerConfig};
use vm_shared::{error_codes, ErrorResponse};

use crate::handlers::json_error_handler;
use crate::middleware::create_cors;
use crate::routes;

/// Verification service over trait objects, as wired by the binary
pub type SharedVerificationService =
    VerificationService<dyn VerificationRecordStore, dyn IdentityRepository, dyn Notifier>;

/// Application state that holds shared services
pub struct AppState {
    pub verification: Arc<SharedVerificationService>,
}

impl AppState {
    pub fn new(verification: Arc<SharedVerificationService>) -> Self {
        Self { verification }
    }
}

/// Create and configure the application with all dependencies
pub fn create_app(
    app_state: web::Data<AppState>,
    server: &ServerConfig,
    environment: Environment,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let json_config = web::JsonConfig::default()
        .limit(server.max_payload_size)
        .error_handler(json_error_handler);

    App::new()
        .app_data(app_state)
        .app_data(json_config)
        // Middleware order: CORS runs inside logging so rejected preflights are logged
        .wrap(create_cors(server, environment))
        .wrap(Logger::default())
        .route("/health", web::get().to(routes::health::health_check))
        .service(web::scope("/api/v1").configure(routes::verification::configure))
        .default_service(web::route().to(not_found))
}

/// Default 404 handler
async fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(ErrorResponse::new(
        error_codes::NOT_FOUND,
        "The requested resource was not found",
    ))
}
