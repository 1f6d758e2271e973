use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A pending phone-verification code. At most one active session exists per
/// phone number; requesting a new code overwrites the old session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationSession {
    pub phone: String,
    pub code: String,
    pub expires_at: NaiveDateTime,
    pub attempts_remaining: i32,
}

impl VerificationSession {
    pub fn is_expired(&self, now: NaiveDateTime) -> bool {
        self.expires_at <= now
    }
}
