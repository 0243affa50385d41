use serde::{Deserialize, Serialize};
use validator::Validate;

use vm_core::{CodeDispatch, VerifiedIdentity};

/// Body of `request-code` and `resend-code`
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RequestCodeRequest {
    /// Address to verify; normalized (trimmed, lowercased) by the service
    #[validate(length(min = 1, max = 254))]
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SubmitCodeRequest {
    #[validate(length(min = 1, max = 254))]
    pub email: String,

    /// 6-digit verification code
    #[validate(length(min = 1, max = 16))]
    pub code: String,

    /// Display name for the new identity
    #[validate(length(min = 1, max = 100))]
    pub name: String,

    /// Opaque credential material, handed to the identity store as received
    #[validate(length(min = 1, max = 1024))]
    pub credential: String,
}

/// Successful `request-code` / `resend-code` response. Never carries the code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchResponse {
    /// `issued` or `resent`
    pub status: String,
    /// Seconds until the delivered code stops being accepted
    pub expires_in_seconds: i64,
    /// Seconds until a new code can be minted
    pub retry_after_seconds: i64,
}

impl From<CodeDispatch> for DispatchResponse {
    fn from(dispatch: CodeDispatch) -> Self {
        Self {
            status: dispatch.outcome.as_str().to_string(),
            expires_in_seconds: dispatch.expires_in.num_seconds().max(0),
            retry_after_seconds: dispatch.retry_after.num_seconds().max(0),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifiedResponse {
    pub identity_id: String,
    pub email: String,
}

impl From<VerifiedIdentity> for VerifiedResponse {
    fn from(verified: VerifiedIdentity) -> Self {
        Self {
            identity_id: verified.identity_id.to_string(),
            email: verified.email.into_inner(),
        }
    }
}
