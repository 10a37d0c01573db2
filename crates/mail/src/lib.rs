//! Delivery of confirmation-code emails.
//!
//! Handlers depend on the [`Mailer`] trait only. Three implementations are
//! provided:
//!
//! - [`SmtpMailer`]: real delivery through an SMTP relay (`lettre`).
//! - [`LogMailer`]: writes the code to the log; used when SMTP is not configured.
//! - [`MemoryMailer`]: keeps messages in memory for tests.

pub mod memory;
pub mod smtp;

use async_trait::async_trait;

pub use memory::{MemoryMailer, SentMail};
pub use smtp::{EmailConfig, SmtpMailer};

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Error type for email delivery failures.
#[derive(Debug, thiserror::Error)]
pub enum MailError {
    /// SMTP transport-level failure (authentication, connection, etc.).
    #[error("SMTP transport error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),

    /// The recipient or sender address could not be parsed.
    #[error("Email address parse error: {0}")]
    Address(#[from] lettre::address::AddressError),

    /// The MIME message could not be assembled.
    #[error("Email build error: {0}")]
    Build(String),

    /// Delivery was refused without reaching a transport.
    #[error("Email delivery rejected: {0}")]
    Rejected(String),
}

// ---------------------------------------------------------------------------
// Mailer
// ---------------------------------------------------------------------------

/// Subject line of every confirmation email.
pub const CONFIRMATION_SUBJECT: &str = "YaMDb confirmation code";

/// Sends confirmation codes to users.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send_confirmation_code(
        &self,
        to: &str,
        username: &str,
        code: &str,
    ) -> Result<(), MailError>;
}

/// Plain-text body of a confirmation email.
pub fn confirmation_body(username: &str, code: &str) -> String {
    format!(
        "Hello, {username}!\n\n\
         Your confirmation code is: {code}\n\n\
         Exchange it for an access token at /api/v1/auth/token."
    )
}

/// Logs confirmation codes instead of sending them.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send_confirmation_code(
        &self,
        to: &str,
        username: &str,
        code: &str,
    ) -> Result<(), MailError> {
        tracing::info!(to, username, code, "SMTP not configured; confirmation code logged");
        Ok(())
    }
}
