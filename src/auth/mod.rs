use chrono::Utc;
use hmac::{Hmac, Mac};
use rand::Rng;
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Alphabet used for token identifiers
const ID_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Keyed SHA-256 digest of `plaintext`, hex encoded.
///
/// Deterministic for a given secret and input. Returns `None` for empty input so
/// callers can never end up persisting an empty or plaintext password.
pub fn hash_password(secret: &str, plaintext: &str) -> Option<String> {
    if plaintext.is_empty() {
        return None;
    }

    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).ok()?;
    mac.update(plaintext.as_bytes());
    Some(format!("{:x}", mac.finalize().into_bytes()))
}

/// `length` characters drawn uniformly from lowercase letters and digits
pub fn random_string(length: usize) -> Option<String> {
    if length == 0 {
        return None;
    }

    let mut rng = rand::thread_rng();
    let id = (0..length)
        .map(|_| char::from(ID_ALPHABET[rng.gen_range(0..ID_ALPHABET.len())]))
        .collect();
    Some(id)
}

/// Current time as unix milliseconds
pub fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

pub fn expiry_from(now_ms: i64, ttl_ms: i64) -> i64 {
    now_ms.saturating_add(ttl_ms)
}

/// A timestamp equal to `now` is already expired
pub fn is_expired(expires_ms: i64, now_ms: i64) -> bool {
    expires_ms <= now_ms
}
