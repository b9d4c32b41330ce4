use serde::{Deserialize, Serialize};

use crate::auth;

/// Resource type (store subdirectory) for tokens
pub const TOKENS: &str = "tokens";

/// Session token minted at login.
///
/// `phone` references the user the token was issued for. Expired tokens stay on
/// disk until explicitly deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub id: String,
    pub phone: String,
    /// Unix timestamp in milliseconds
    pub expires: i64,
}

impl Token {
    pub fn is_expired_at(&self, now_ms: i64) -> bool {
        auth::is_expired(self.expires, now_ms)
    }

    /// Push expiry to `now + ttl`; an extension never moves it backwards
    pub fn extend(&mut self, now_ms: i64, ttl_ms: i64) {
        let renewed = auth::expiry_from(now_ms, ttl_ms);
        self.expires = renewed.max(self.expires.saturating_add(1));
    }
}
