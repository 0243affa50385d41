use actix_web::{web, HttpRequest, HttpResponse};
use validator::Validate;

use vm_shared::validation::mask_email;

use super::extract_client_ip;
use crate::app::AppState;
use crate::dto::{DispatchResponse, RequestCodeRequest};
use crate::handlers::{domain_error_response, validation_error_response};

/// Handler for POST /api/v1/verification/request-code
///
/// # Request Body
///
/// ```json
/// { "email": "alice@example.com" }
/// ```
///
/// # Response
///
/// ## Success (200 OK)
/// ```json
/// { "status": "issued", "expires_in_seconds": 300, "retry_after_seconds": 300 }
/// ```
///
/// ## Errors
/// - 400 invalid email
/// - 429 rate limited, with `Retry-After`
/// - 502 delivery failed (the code was stored; a later request resends it)
pub async fn request_code(
    req: HttpRequest,
    state: web::Data<AppState>,
    request: web::Json<RequestCodeRequest>,
) -> HttpResponse {
    if let Err(errors) = request.validate() {
        log::warn!("Validation failed for request_code: {:?}", errors.field_errors().keys());
        return validation_error_response(&errors);
    }

    log::info!(
        "Processing request_code for {} from {}",
        mask_email(&request.email),
        extract_client_ip(&req)
    );

    match state.verification.request_code(&request.email).await {
        Ok(dispatch) => HttpResponse::Ok().json(DispatchResponse::from(dispatch)),
        Err(error) => {
            log::warn!(
                "request_code failed for {}: {}",
                mask_email(&request.email),
                error.error_code()
            );
            domain_error_response(&error)
        }
    }
}
