// src/utils/mail.rs

use async_trait::async_trait;

use crate::error::AppError;

/// Outbound email seam. Delivery mechanics live behind this trait so the
/// handlers only ever know "send this subject/body to this address".
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), AppError>;
}

/// Mailer that records outbound messages in the application log instead of
/// talking to an SMTP relay. This is the default wiring; deployments with a
/// real relay swap in their own `Mailer` when building `AppState`.
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), AppError> {
        tracing::info!(to, subject, "outbound mail: {}", body);
        Ok(())
    }
}

/// Renders the one-time passcode email body.
pub fn otp_body(otp: &str, minutes: i64) -> String {
    format!("Your OTP code is {}. It expires in {} minutes.", otp, minutes)
}
