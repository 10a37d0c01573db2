//! Confirmation-code settings.

use yamdb_core::confirmation::{ConfirmationCodes, DEFAULT_CODE_TTL_SECS};

/// Secret and lifetime of the codes emailed at sign-up.
#[derive(Debug, Clone)]
pub struct ConfirmationConfig {
    pub secret: String,
    /// Code lifetime in seconds (default: 259200, three days).
    pub code_ttl_secs: i64,
}

impl ConfirmationConfig {
    /// Load from environment variables.
    ///
    /// | Env Var                      | Required | Default        |
    /// |------------------------------|----------|----------------|
    /// | `CONFIRMATION_SECRET`        | no       | `fallback_secret` |
    /// | `CONFIRMATION_CODE_TTL_SECS` | no       | `259200`       |
    pub fn from_env(fallback_secret: &str) -> Self {
        let secret = std::env::var("CONFIRMATION_SECRET")
            .ok()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| fallback_secret.to_string());

        let code_ttl_secs: i64 = std::env::var("CONFIRMATION_CODE_TTL_SECS")
            .unwrap_or_else(|_| DEFAULT_CODE_TTL_SECS.to_string())
            .parse()
            .expect("CONFIRMATION_CODE_TTL_SECS must be a valid i64");

        Self {
            secret,
            code_ttl_secs,
        }
    }

    /// The issuer/verifier for this configuration.
    pub fn codes(&self) -> ConfirmationCodes {
        ConfirmationCodes::new(self.secret.clone(), self.code_ttl_secs)
    }
}
