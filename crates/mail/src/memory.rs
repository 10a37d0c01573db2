//! In-memory outbox.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::{MailError, Mailer};

/// A message captured by [`MemoryMailer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMail {
    pub to: String,
    pub username: String,
    pub code: String,
}

/// Records every message instead of delivering it. Can be switched into a
/// failing mode to exercise delivery errors, or a slow mode that stands in
/// for a sluggish mail server.
#[derive(Debug, Default)]
pub struct MemoryMailer {
    outbox: Mutex<Vec<SentMail>>,
    fail: bool,
    delay: Option<Duration>,
}

impl MemoryMailer {
    pub fn new() -> Self {
        Self::default()
    }

    /// A mailer whose every send fails with [`MailError::Rejected`].
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// A mailer that waits `delay` before recording each message.
    pub fn delayed(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    /// All messages sent so far, oldest first.
    pub fn sent(&self) -> Vec<SentMail> {
        self.outbox
            .lock()
            .map(|outbox| outbox.clone())
            .unwrap_or_default()
    }

    /// The most recent code sent to `to`, if any.
    pub fn last_code_for(&self, to: &str) -> Option<String> {
        self.sent()
            .into_iter()
            .rev()
            .find(|m| m.to == to)
            .map(|m| m.code)
    }
}

#[async_trait]
impl Mailer for MemoryMailer {
    async fn send_confirmation_code(
        &self,
        to: &str,
        username: &str,
        code: &str,
    ) -> Result<(), MailError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail {
            return Err(MailError::Rejected(format!("outbox closed for {to}")));
        }
        let mail = SentMail {
            to: to.to_string(),
            username: username.to_string(),
            code: code.to_string(),
        };
        self.outbox
            .lock()
            .map_err(|_| MailError::Rejected("outbox lock poisoned".into()))?
            .push(mail);
        Ok(())
    }
}
