//! Mapping of domain and request errors to HTTP responses
//!
//! Policy outcomes are reported with their own message; infrastructure
//! failures get a generic message and the detail goes to the log only.

use actix_web::{
    error::{InternalError, JsonPayloadError},
    http::header,
    HttpRequest, HttpResponse,
};
use std::collections::HashMap;

use vm_core::errors::{DomainError, ValidationError, VerificationError};
use vm_shared::{error_codes, ErrorResponse};

/// Convert a domain error into the response sent to the client
pub fn domain_error_response(error: &DomainError) -> HttpResponse {
    let code = error.error_code();

    match error {
        DomainError::Validation(validation) => {
            let mut body = ErrorResponse::new(code, validation.to_string());
            if let ValidationError::RequiredField { field } | ValidationError::InvalidFormat { field } =
                validation
            {
                body = body.add_detail("field", field);
            }
            HttpResponse::BadRequest().json(body)
        }
        DomainError::Verification(verification) => match verification {
            VerificationError::RateLimited {
                retry_after_minutes,
                retry_after_seconds,
            } => HttpResponse::TooManyRequests()
                .insert_header((header::RETRY_AFTER, retry_after_seconds.to_string()))
                .json(
                    ErrorResponse::new(code, verification.to_string())
                        .add_detail("retry_after_minutes", retry_after_minutes)
                        .add_detail("retry_after_seconds", retry_after_seconds),
                ),
            VerificationError::InvalidCode | VerificationError::CodeExpired => {
                HttpResponse::BadRequest().json(ErrorResponse::new(code, verification.to_string()))
            }
            VerificationError::DuplicateIdentity => {
                HttpResponse::Conflict().json(ErrorResponse::new(code, verification.to_string()))
            }
            VerificationError::DeliveryFailed { reason } => {
                log::error!("Verification email delivery failed: {}", reason);
                HttpResponse::BadGateway().json(ErrorResponse::new(
                    code,
                    "The verification email could not be delivered. Please try again later",
                ))
            }
        },
        DomainError::Timeout { operation } => {
            log::error!("Upstream timeout in {}", operation);
            HttpResponse::GatewayTimeout().json(ErrorResponse::new(
                code,
                "The request timed out. Please try again later",
            ))
        }
        DomainError::Store { .. } | DomainError::Internal { .. } => {
            log::error!("Internal error: {}", error);
            HttpResponse::InternalServerError()
                .json(ErrorResponse::new(code, "An internal error occurred"))
        }
    }
}

/// 400 response listing the fields that failed DTO validation
pub fn validation_error_response(errors: &validator::ValidationErrors) -> HttpResponse {
    let fields: HashMap<String, Vec<String>> = errors
        .field_errors()
        .into_iter()
        .map(|(field, errors)| {
            let messages = errors
                .iter()
                .map(|e| {
                    e.message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string())
                })
                .collect();
            (field.to_string(), messages)
        })
        .collect();

    HttpResponse::BadRequest().json(
        ErrorResponse::new(error_codes::VALIDATION_ERROR, "Invalid request data")
            .add_detail("fields", fields),
    )
}

/// `JsonConfig` error handler: malformed or oversized bodies become a 400
/// in the standard error shape instead of actix's plain-text default
pub fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    let message = match &err {
        JsonPayloadError::OverflowKnownLength { .. } | JsonPayloadError::Overflow { .. } => {
            "Request body is too large".to_string()
        }
        JsonPayloadError::ContentType => "Content type must be application/json".to_string(),
        _ => format!("Malformed JSON body: {}", err),
    };
    let response = HttpResponse::BadRequest()
        .json(ErrorResponse::new(error_codes::VALIDATION_ERROR, message));
    InternalError::from_response(err, response).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{body::to_bytes, http::StatusCode};

    async fn body_json(response: HttpResponse) -> serde_json::Value {
        let bytes = to_bytes(response.into_body()).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[actix_rt::test]
    async fn test_rate_limited_sets_retry_after() {
        let error = DomainError::from(VerificationError::RateLimited {
            retry_after_minutes: 4,
            retry_after_seconds: 230,
        });
        let response = domain_error_response(&error);

        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers().get(header::RETRY_AFTER).unwrap(), "230");

        let body = body_json(response).await;
        assert_eq!(body["error"], "RATE_LIMIT_EXCEEDED");
        assert_eq!(body["details"]["retry_after_minutes"], 4);
    }

    #[actix_rt::test]
    async fn test_invalid_and_expired_are_distinct() {
        let invalid = domain_error_response(&VerificationError::InvalidCode.into());
        let expired = domain_error_response(&VerificationError::CodeExpired.into());

        assert_eq!(invalid.status(), StatusCode::BAD_REQUEST);
        assert_eq!(expired.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(invalid).await["error"], "VERIFICATION_CODE_INVALID");
        assert_eq!(body_json(expired).await["error"], "VERIFICATION_CODE_EXPIRED");
    }

    #[actix_rt::test]
    async fn test_store_failure_hides_detail() {
        let response = domain_error_response(&DomainError::store("connection refused at 10.0.0.5"));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_json(response).await;
        assert_eq!(body["error"], "INTERNAL_ERROR");
        assert!(!body["message"].as_str().unwrap().contains("10.0.0.5"));
    }

    #[actix_rt::test]
    async fn test_status_mapping() {
        let cases = vec![
            (DomainError::from(ValidationError::InvalidEmail), StatusCode::BAD_REQUEST),
            (VerificationError::DuplicateIdentity.into(), StatusCode::CONFLICT),
            (
                VerificationError::DeliveryFailed {
                    reason: "status 503".to_string(),
                }
                .into(),
                StatusCode::BAD_GATEWAY,
            ),
            (
                DomainError::Timeout {
                    operation: "verification.find_by_email".to_string(),
                },
                StatusCode::GATEWAY_TIMEOUT,
            ),
        ];

        for (error, expected) in cases {
            assert_eq!(domain_error_response(&error).status(), expected, "{:?}", error);
        }
    }
}
