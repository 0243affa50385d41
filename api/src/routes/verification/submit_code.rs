use actix_web::{web, HttpRequest, HttpResponse};
use validator::Validate;

use vm_core::errors::DomainError;
use vm_core::PendingRegistration;
use vm_shared::validation::mask_email;

use super::extract_client_ip;
use crate::app::AppState;
use crate::dto::{SubmitCodeRequest, VerifiedResponse};
use crate::handlers::{domain_error_response, validation_error_response};

/// Handler for POST /api/v1/verification/submit-code
///
/// # Request Body
///
/// ```json
/// {
///     "email": "alice@example.com",
///     "code": "482913",
///     "name": "Alice",
///     "credential": "..."
/// }
/// ```
///
/// # Response
///
/// ## Success (200 OK)
/// ```json
/// { "identity_id": "550e8400-e29b-41d4-a716-446655440000", "email": "alice@example.com" }
/// ```
///
/// ## Errors
/// - 400 `VERIFICATION_CODE_INVALID` or `VERIFICATION_CODE_EXPIRED`
/// - 409 an identity already exists for the email
pub async fn submit_code(
    req: HttpRequest,
    state: web::Data<AppState>,
    request: web::Json<SubmitCodeRequest>,
) -> HttpResponse {
    if let Err(errors) = request.validate() {
        return validation_error_response(&errors);
    }

    let registration = match PendingRegistration::new(&request.name, &request.credential) {
        Ok(registration) => registration,
        Err(error) => return domain_error_response(&DomainError::from(error)),
    };

    log::info!(
        "Processing submit_code for {} from {}",
        mask_email(&request.email),
        extract_client_ip(&req)
    );

    match state
        .verification
        .submit_code(&request.email, &request.code, registration)
        .await
    {
        Ok(verified) => HttpResponse::Ok().json(VerifiedResponse::from(verified)),
        Err(error) => {
            log::warn!(
                "submit_code failed for {}: {}",
                mask_email(&request.email),
                error.error_code()
            );
            domain_error_response(&error)
        }
    }
}
