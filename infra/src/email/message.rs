//! Verification email content

/// Rendered verification email body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationMessage {
    pub text: String,
    pub html: String,
}

impl VerificationMessage {
    /// Render the message for a code valid for `validity`
    pub fn render(code: &str, validity: chrono::Duration) -> Self {
        let minutes = validity.num_minutes().max(1);
        let unit = if minutes == 1 { "minute" } else { "minutes" };

        let text = format!(
            "Your verification code is {code}.\n\n\
             It expires in {minutes} {unit}. If you did not request this code, \
             you can ignore this email."
        );
        let html = format!(
            "<p>Your verification code is</p>\
             <p style=\"font-size:24px;font-weight:bold;letter-spacing:4px\">{code}</p>\
             <p>It expires in {minutes} {unit}. If you did not request this code, \
             you can ignore this email.</p>"
        );

        Self { text, html }
    }
}
