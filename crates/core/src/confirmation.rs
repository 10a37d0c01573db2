//! Stateless, time-limited email confirmation codes.
//!
//! A code has the form `<issued_at base36>-<signature>`, where the signature
//! is the first 20 hex digits of `HMAC-SHA256(secret, "user_id:email:issued_at")`.
//! Nothing is persisted: a code stays valid until it expires, however many
//! times it is exchanged, and stops verifying as soon as the user's email
//! changes.

use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::types::{DbId, Timestamp};

type HmacSha256 = Hmac<Sha256>;

/// Default code lifetime: three days.
pub const DEFAULT_CODE_TTL_SECS: i64 = 3 * 24 * 60 * 60;

/// Number of hex digits of the HMAC kept in a code.
const SIGNATURE_HEX_LEN: usize = 20;

/// Issues and verifies confirmation codes with a shared secret.
#[derive(Debug, Clone)]
pub struct ConfirmationCodes {
    secret: String,
    ttl_secs: i64,
}

impl ConfirmationCodes {
    pub fn new(secret: impl Into<String>, ttl_secs: i64) -> Self {
        Self {
            secret: secret.into(),
            ttl_secs,
        }
    }

    /// Issue a code for `user_id` / `email`, stamped with `now`.
    pub fn issue(&self, user_id: DbId, email: &str, now: Timestamp) -> String {
        let issued_at = now.timestamp();
        let signature = hex::encode(self.mac(user_id, email, issued_at).finalize().into_bytes());
        format!(
            "{}-{}",
            base36::encode(issued_at),
            &signature[..SIGNATURE_HEX_LEN]
        )
    }

    /// Check `code` against `user_id` / `email` at time `now`.
    ///
    /// Malformed, forged, future-dated, and expired codes all return `false`.
    pub fn verify(&self, code: &str, user_id: DbId, email: &str, now: Timestamp) -> bool {
        let Some((stamp, signature)) = code.split_once('-') else {
            return false;
        };
        let Some(issued_at) = base36::decode(stamp) else {
            return false;
        };

        let age = now.timestamp() - issued_at;
        if age < 0 || age > self.ttl_secs {
            return false;
        }

        if signature.len() != SIGNATURE_HEX_LEN {
            return false;
        }
        let Some(tag) = hex::decode(signature) else {
            return false;
        };

        self.mac(user_id, email, issued_at)
            .verify_truncated_left(&tag)
            .is_ok()
    }

    fn mac(&self, user_id: DbId, email: &str, issued_at: i64) -> HmacSha256 {
        let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes())
            .expect("HMAC accepts any key length");
        mac.update(format!("{user_id}:{email}:{issued_at}").as_bytes());
        mac
    }
}

// ---------------------------------------------------------------------------
// Encoding helpers (no extra dep)
// ---------------------------------------------------------------------------

mod hex {
    /// Encode bytes as a lowercase hex string.
    pub fn encode(bytes: impl AsRef<[u8]>) -> String {
        bytes.as_ref().iter().map(|b| format!("{b:02x}")).collect()
    }

    /// Decode an even-length hex string.
    pub fn decode(s: &str) -> Option<Vec<u8>> {
        if s.len() % 2 != 0 || !s.is_ascii() {
            return None;
        }
        (0..s.len())
            .step_by(2)
            .map(|i| u8::from_str_radix(&s[i..i + 2], 16).ok())
            .collect()
    }
}

mod base36 {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

    pub fn encode(mut n: i64) -> String {
        if n <= 0 {
            return "0".to_string();
        }
        let mut out = Vec::new();
        while n > 0 {
            out.push(DIGITS[(n % 36) as usize]);
            n /= 36;
        }
        out.reverse();
        String::from_utf8(out).unwrap_or_default()
    }

    pub fn decode(s: &str) -> Option<i64> {
        if s.is_empty() || s.len() > 13 {
            return None;
        }
        i64::from_str_radix(s, 36).ok().filter(|n| *n >= 0)
    }
}
