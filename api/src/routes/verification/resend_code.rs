use actix_web::{web, HttpRequest, HttpResponse};
use validator::Validate;

use vm_shared::validation::mask_email;

use super::extract_client_ip;
use crate::app::AppState;
use crate::dto::{DispatchResponse, RequestCodeRequest};
use crate::handlers::{domain_error_response, validation_error_response};

/// Handler for POST /api/v1/verification/resend-code
///
/// Same body, policy and responses as `request-code`; a missing record is
/// not an error, a fresh code is issued instead.
pub async fn resend_code(
    req: HttpRequest,
    state: web::Data<AppState>,
    request: web::Json<RequestCodeRequest>,
) -> HttpResponse {
    if let Err(errors) = request.validate() {
        return validation_error_response(&errors);
    }

    log::info!(
        "Processing resend_code for {} from {}",
        mask_email(&request.email),
        extract_client_ip(&req)
    );

    match state.verification.resend_code(&request.email).await {
        Ok(dispatch) => HttpResponse::Ok().json(DispatchResponse::from(dispatch)),
        Err(error) => {
            log::warn!(
                "resend_code failed for {}: {}",
                mask_email(&request.email),
                error.error_code()
            );
            domain_error_response(&error)
        }
    }
}
