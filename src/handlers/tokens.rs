// handlers/tokens.rs - /api/tokens
//
// POST   login  (phone, password) -> token
// GET    read   (?id=)
// PUT    extend (id, extend: true)
// DELETE logout (?id=)

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{error, info, warn};

use crate::api::{Handler, HandlerResponse, RequestContext};
use crate::auth;
use crate::database::models::{Token, User, TOKENS, USERS};
use crate::database::StoreError;
use crate::error::ApiError;
use crate::state::AppContext;

use super::validate;

pub struct TokensHandler {
    app: AppContext,
}

impl TokensHandler {
    pub fn new(app: AppContext) -> Self {
        Self { app }
    }

    fn id_length(&self) -> usize {
        self.app.config.security.token_id_length
    }

    fn ttl_ms(&self) -> i64 {
        self.app.config.security.token_ttl_ms
    }

    async fn create(&self, ctx: &RequestContext) -> Result<Value, ApiError> {
        let (Some(phone), Some(password)) = (
            validate::phone(ctx.field("phone")),
            validate::non_empty_string(ctx.field("password")),
        ) else {
            return Err(ApiError::bad_request("Missing required field(s)"));
        };

        let user: User = match self.app.store.read(USERS, &phone).await {
            Ok(user) => user,
            Err(StoreError::NotFound { .. }) => {
                return Err(ApiError::bad_request("Could not find the specified user"));
            }
            Err(e) => return Err(e.into()),
        };

        let hashed = auth::hash_password(self.app.hashing_secret(), &password)
            .ok_or_else(|| ApiError::internal_server_error("Could not hash the password"))?;

        if hashed != user.hashed_password {
            warn!("Rejected login for {}: password mismatch", phone);
            return Err(ApiError::bad_request(
                "Password did not match the specified user's stored password",
            ));
        }

        let id = auth::random_string(self.id_length())
            .ok_or_else(|| ApiError::internal_server_error("Could not generate a token id"))?;

        let token = Token {
            id,
            phone,
            expires: auth::expiry_from(auth::now_ms(), self.ttl_ms()),
        };

        if let Err(e) = self.app.store.create(TOKENS, &token.id, &token).await {
            error!("Could not create token for {}: {}", token.phone, e);
            return Err(ApiError::internal_server_error("Could not create the new token"));
        }

        info!("Issued token for {}", token.phone);
        serde_json::to_value(&token)
            .map_err(|e| ApiError::internal_server_error(e.to_string()))
    }

    async fn read(&self, ctx: &RequestContext) -> Result<Value, ApiError> {
        let id = ctx
            .query_param("id")
            .and_then(|id| validate::token_id_param(id, self.id_length()))
            .ok_or_else(|| ApiError::bad_request("Missing required field"))?;

        match self.app.store.read::<Token>(TOKENS, &id).await {
            Ok(token) => serde_json::to_value(&token)
                .map_err(|e| ApiError::internal_server_error(e.to_string())),
            Err(StoreError::NotFound { .. }) => Err(ApiError::not_found("Token not found")),
            Err(e) => Err(e.into()),
        }
    }

    async fn update(&self, ctx: &RequestContext) -> Result<Value, ApiError> {
        let id = validate::token_id(ctx.field("id"), self.id_length());
        let extend = validate::affirmative(ctx.field("extend"));

        let (Some(id), true) = (id, extend) else {
            return Err(ApiError::bad_request(
                "Missing required field(s) or field(s) are invalid",
            ));
        };

        let _guard = self.app.locks.acquire(TOKENS, &id).await;

        let mut token: Token = match self.app.store.read(TOKENS, &id).await {
            Ok(token) => token,
            Err(StoreError::NotFound { .. }) => {
                return Err(ApiError::bad_request("Specified token does not exist"));
            }
            Err(e) => return Err(e.into()),
        };

        let now = auth::now_ms();
        if token.is_expired_at(now) {
            return Err(ApiError::bad_request(
                "The token has already expired, and cannot be extended",
            ));
        }

        token.extend(now, self.ttl_ms());

        match self.app.store.update(TOKENS, &id, &token).await {
            Ok(()) => Ok(json!({})),
            Err(StoreError::NotFound { .. }) => {
                Err(ApiError::bad_request("Specified token does not exist"))
            }
            Err(e) => {
                error!("Could not extend token {}: {}", id, e);
                Err(ApiError::internal_server_error("Could not update the token's expiration"))
            }
        }
    }

    async fn delete(&self, ctx: &RequestContext) -> Result<Value, ApiError> {
        let id = ctx
            .query_param("id")
            .and_then(|id| validate::token_id_param(id, self.id_length()))
            .ok_or_else(|| ApiError::bad_request("Missing required field"))?;

        let _guard = self.app.locks.acquire(TOKENS, &id).await;

        match self.app.store.read::<Value>(TOKENS, &id).await {
            Ok(_) | Err(StoreError::Parse { .. }) => {}
            Err(StoreError::NotFound { .. }) => {
                return Err(ApiError::bad_request("Could not find the specified token"));
            }
            Err(e) => return Err(e.into()),
        }

        match self.app.store.delete(TOKENS, &id).await {
            Ok(()) => Ok(json!({})),
            Err(StoreError::NotFound { .. }) => {
                Err(ApiError::bad_request("Could not find the specified token"))
            }
            Err(e) => {
                error!("Could not delete token {}: {}", id, e);
                Err(ApiError::internal_server_error("Could not delete the specified token"))
            }
        }
    }
}

#[async_trait]
impl Handler for TokensHandler {
    async fn handle(&self, ctx: &RequestContext) -> HandlerResponse {
        let result = match ctx.method.as_str() {
            "post" => self.create(ctx).await,
            "get" => self.read(ctx).await,
            "put" => self.update(ctx).await,
            "delete" => self.delete(ctx).await,
            other => Err(ApiError::method_not_allowed(other)),
        };

        match result {
            Ok(value) => HandlerResponse::ok(value),
            Err(e) => e.into(),
        }
    }
}
