// handlers/users.rs - /api/users
//
// POST   create (firstName, lastName, phone, password, tosAgreement)
// GET    read   (?phone=)
// PUT    update (phone + at least one of firstName, lastName, password)
// DELETE delete (?phone=)

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{error, info};

use crate::api::{Handler, HandlerResponse, RequestContext};
use crate::auth;
use crate::database::models::{User, USERS};
use crate::database::StoreError;
use crate::error::ApiError;
use crate::state::AppContext;

use super::validate;

pub struct UsersHandler {
    app: AppContext,
}

impl UsersHandler {
    pub fn new(app: AppContext) -> Self {
        Self { app }
    }

    async fn create(&self, ctx: &RequestContext) -> Result<Value, ApiError> {
        let first_name = validate::non_empty_string(ctx.field("firstName"));
        let last_name = validate::non_empty_string(ctx.field("lastName"));
        let phone = validate::phone(ctx.field("phone"));
        let password = validate::non_empty_string(ctx.field("password"));
        let tos_agreement = validate::affirmative(ctx.field("tosAgreement"));

        let (Some(first_name), Some(last_name), Some(phone), Some(password), true) =
            (first_name, last_name, phone, password, tos_agreement)
        else {
            return Err(ApiError::bad_request("Missing required fields"));
        };

        // A corrupt record still occupies the key
        match self.app.store.read::<Value>(USERS, &phone).await {
            Ok(_) | Err(StoreError::Parse { .. }) => {
                return Err(ApiError::conflict("A user with that phone number already exists"));
            }
            Err(StoreError::NotFound { .. }) => {}
            Err(e) => return Err(e.into()),
        }

        let hashed_password = auth::hash_password(self.app.hashing_secret(), &password)
            .ok_or_else(|| ApiError::internal_server_error("Could not hash the user's password"))?;

        let user = User {
            first_name,
            last_name,
            phone,
            hashed_password,
            tos_agreement: true,
        };

        match self.app.store.create(USERS, &user.phone, &user).await {
            Ok(()) => {
                info!("Created user {}", user.phone);
                Ok(json!({}))
            }
            Err(StoreError::AlreadyExists { .. }) => {
                Err(ApiError::conflict("A user with that phone number already exists"))
            }
            Err(e) => {
                error!("Could not create user {}: {}", user.phone, e);
                Err(ApiError::internal_server_error("Could not create the new user"))
            }
        }
    }

    async fn read(&self, ctx: &RequestContext) -> Result<Value, ApiError> {
        let phone = ctx
            .query_param("phone")
            .and_then(validate::phone_param)
            .ok_or_else(|| ApiError::bad_request("Missing required field"))?;

        self.app.authorizer.authorize(&ctx.headers, &phone).await?;

        match self.app.store.read::<User>(USERS, &phone).await {
            Ok(user) => Ok(user.public_view()),
            Err(StoreError::NotFound { .. }) => Err(ApiError::not_found("User not found")),
            Err(e) => Err(e.into()),
        }
    }

    async fn update(&self, ctx: &RequestContext) -> Result<Value, ApiError> {
        let phone = validate::phone(ctx.field("phone"))
            .ok_or_else(|| ApiError::bad_request("Missing required field"))?;

        let first_name = validate::non_empty_string(ctx.field("firstName"));
        let last_name = validate::non_empty_string(ctx.field("lastName"));
        let password = validate::non_empty_string(ctx.field("password"));

        if first_name.is_none() && last_name.is_none() && password.is_none() {
            return Err(ApiError::bad_request("Missing fields to update"));
        }

        self.app.authorizer.authorize(&ctx.headers, &phone).await?;

        let _guard = self.app.locks.acquire(USERS, &phone).await;

        let mut user: User = match self.app.store.read(USERS, &phone).await {
            Ok(user) => user,
            Err(StoreError::NotFound { .. }) => {
                return Err(ApiError::bad_request("The specified user does not exist"));
            }
            Err(e) => return Err(e.into()),
        };

        if let Some(first_name) = first_name {
            user.first_name = first_name;
        }
        if let Some(last_name) = last_name {
            user.last_name = last_name;
        }
        if let Some(password) = password {
            user.hashed_password = auth::hash_password(self.app.hashing_secret(), &password)
                .ok_or_else(|| ApiError::internal_server_error("Could not hash the user's password"))?;
        }

        match self.app.store.update(USERS, &phone, &user).await {
            Ok(()) => {
                info!("Updated user {}", phone);
                Ok(json!({}))
            }
            Err(StoreError::NotFound { .. }) => {
                Err(ApiError::bad_request("The specified user does not exist"))
            }
            Err(e) => {
                error!("Could not update user {}: {}", phone, e);
                Err(ApiError::internal_server_error("Could not update the user"))
            }
        }
    }

    async fn delete(&self, ctx: &RequestContext) -> Result<Value, ApiError> {
        let phone = ctx
            .query_param("phone")
            .and_then(validate::phone_param)
            .ok_or_else(|| ApiError::bad_request("Missing required field"))?;

        self.app.authorizer.authorize(&ctx.headers, &phone).await?;

        let _guard = self.app.locks.acquire(USERS, &phone).await;

        match self.app.store.read::<Value>(USERS, &phone).await {
            Ok(_) | Err(StoreError::Parse { .. }) => {}
            Err(StoreError::NotFound { .. }) => {
                return Err(ApiError::bad_request("Could not find the specified user"));
            }
            Err(e) => return Err(e.into()),
        }

        // Tokens issued for this phone are left in place
        match self.app.store.delete(USERS, &phone).await {
            Ok(()) => {
                info!("Deleted user {}", phone);
                Ok(json!({}))
            }
            Err(StoreError::NotFound { .. }) => {
                Err(ApiError::bad_request("Could not find the specified user"))
            }
            Err(e) => {
                error!("Could not delete user {}: {}", phone, e);
                Err(ApiError::internal_server_error("Could not delete the specified user"))
            }
        }
    }
}

#[async_trait]
impl Handler for UsersHandler {
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
