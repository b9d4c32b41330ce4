use async_trait::async_trait;
use std::collections::HashMap;
use tracing::{debug, warn};

use crate::auth;
use crate::database::models::{Token, TOKENS};
use crate::database::FileStore;
use crate::error::ApiError;

/// Header carrying a token id on protected routes
pub const TOKEN_HEADER: &str = "token";

/// Decides whether the caller may act on the user identified by `phone`.
///
/// Handlers call this after input validation and before touching the store.
#[async_trait]
pub trait Authorizer: Send + Sync {
    async fn authorize(&self, headers: &HashMap<String, String>, phone: &str) -> Result<(), ApiError>;
}

/// Allows every request.
///
/// This is the default: ownership checks are switched off unless
/// `security.enforce_ownership` is set, and this type is the explicit stub for
/// that mode.
#[derive(Debug, Default, Clone)]
pub struct OpenAccess;

#[async_trait]
impl Authorizer for OpenAccess {
    async fn authorize(&self, _headers: &HashMap<String, String>, phone: &str) -> Result<(), ApiError> {
        debug!("Ownership check skipped for {}", phone);
        Ok(())
    }
}

/// Requires a live token issued for the same phone number
#[derive(Debug, Clone)]
pub struct TokenOwnership {
    store: FileStore,
}

impl TokenOwnership {
    pub fn new(store: FileStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Authorizer for TokenOwnership {
    async fn authorize(&self, headers: &HashMap<String, String>, phone: &str) -> Result<(), ApiError> {
        let denied = || ApiError::forbidden("Missing required token in header, or token is invalid");

        let token_id = extract_token_from_headers(headers).map_err(|msg| {
            debug!("Ownership check failed for {}: {}", phone, msg);
            denied()
        })?;

        let token: Token = self.store.read(TOKENS, &token_id).await.map_err(|e| {
            warn!("Ownership check could not load token: {}", e);
            denied()
        })?;

        if token.phone != phone || token.is_expired_at(auth::now_ms()) {
            return Err(denied());
        }

        Ok(())
    }
}

/// Extract the token id from the `token` header.
///
/// Accepts a bare id or the `Bearer <id>` form.
pub fn extract_token_from_headers(headers: &HashMap<String, String>) -> Result<String, String> {
    let raw = headers
        .get(TOKEN_HEADER)
        .ok_or_else(|| "Missing token header".to_string())?;

    let token = raw.strip_prefix("Bearer ").unwrap_or(raw).trim();
    if token.is_empty() {
        return Err("Empty token".to_string());
    }
    Ok(token.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(value: Option<&str>) -> HashMap<String, String> {
        value
            .map(|v| HashMap::from([(TOKEN_HEADER.to_string(), v.to_string())]))
            .unwrap_or_default()
    }

    async fn store_with_token(expires: i64) -> (tempfile::TempDir, FileStore, Token) {
        let tmp = tempfile::tempdir().unwrap();
        let store = FileStore::new(tmp.path());
        let token = Token {
            id: "abcdefghij0123456789".to_string(),
            phone: "1234567890".to_string(),
            expires,
        };
        store.create(TOKENS, &token.id, &token).await.unwrap();
        (tmp, store, token)
    }

    #[test]
    fn token_header_forms() {
        assert_eq!(extract_token_from_headers(&headers(Some("abc"))).unwrap(), "abc");
        assert_eq!(extract_token_from_headers(&headers(Some("Bearer abc"))).unwrap(), "abc");
        assert!(extract_token_from_headers(&headers(Some("Bearer  "))).is_err());
        assert!(extract_token_from_headers(&headers(None)).is_err());
    }

    #[tokio::test]
    async fn open_access_allows_anonymous_callers() {
        assert!(OpenAccess.authorize(&headers(None), "1234567890").await.is_ok());
    }

    #[tokio::test]
    async fn ownership_accepts_live_token_for_same_phone() {
        let (_tmp, store, token) = store_with_token(auth::now_ms() + 60_000).await;
        let authorizer = TokenOwnership::new(store);

        assert!(authorizer
            .authorize(&headers(Some(&token.id)), "1234567890")
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn ownership_rejects_other_phone_expired_or_missing_token() {
        let (_tmp, store, token) = store_with_token(auth::now_ms() + 60_000).await;
        let authorizer = TokenOwnership::new(store.clone());

        let err = authorizer
            .authorize(&headers(Some(&token.id)), "0987654321")
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 403);

        let err = authorizer.authorize(&headers(None), "1234567890").await.unwrap_err();
        assert_eq!(err.status_code(), 403);

        let expired = Token {
            id: "zzzzzzzzzz0123456789".to_string(),
            phone: "1234567890".to_string(),
            expires: auth::now_ms() - 1,
        };
        store.create(TOKENS, &expired.id, &expired).await.unwrap();
        let err = authorizer
            .authorize(&headers(Some(&expired.id)), "1234567890")
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 403);
    }
}
