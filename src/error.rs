// HTTP API Error Types
use serde_json::{json, Value};
use thiserror::Error;

use crate::api::response::HandlerResponse;
use crate::database::StoreError;

/// Handler-level failure. The display text is the client-facing message.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    /// Duplicate create; clients see this as a plain 400
    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Method '{0}' is not allowed on this route")]
    MethodNotAllowed(String),

    #[error("{0}")]
    PayloadTooLarge(String),

    #[error("{0}")]
    InternalServerError(String),
}

impl ApiError {
    pub fn status_code(&self) -> u16 {
        use ApiError::*;
        match self {
            BadRequest(_) | Conflict(_) => 400,
            Forbidden(_) => 403,
            NotFound(_) => 404,
            MethodNotAllowed(_) => 405,
            PayloadTooLarge(_) => 413,
            InternalServerError(_) => 500,
        }
    }

    /// Stable machine-readable tag sent alongside the message
    pub fn error_code(&self) -> &'static str {
        use ApiError::*;
        match self {
            BadRequest(_) => "BAD_REQUEST",
            Conflict(_) => "CONFLICT",
            Forbidden(_) => "FORBIDDEN",
            NotFound(_) => "NOT_FOUND",
            MethodNotAllowed(_) => "METHOD_NOT_ALLOWED",
            PayloadTooLarge(_) => "PAYLOAD_TOO_LARGE",
            InternalServerError(_) => "INTERNAL_SERVER_ERROR",
        }
    }

    /// `{"error": true, "message": .., "code": ..}`
    pub fn to_json(&self) -> Value {
        json!({
            "error": true,
            "message": self.to_string(),
            "code": self.error_code(),
        })
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn method_not_allowed(method: &str) -> Self {
        Self::MethodNotAllowed(method.to_string())
    }

    pub fn payload_too_large(message: impl Into<String>) -> Self {
        Self::PayloadTooLarge(message.into())
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        Self::InternalServerError(message.into())
    }
}

// Generic translation for store failures; handlers override where a more
// specific message applies
impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { .. } => ApiError::not_found(err.to_string()),
            StoreError::AlreadyExists { .. } => ApiError::conflict(err.to_string()),
            StoreError::InvalidKey(_) => ApiError::bad_request(err.to_string()),
            StoreError::Parse { .. } | StoreError::Serialize(_) | StoreError::Io(_) => {
                tracing::error!("Record store error: {}", err);
                ApiError::internal_server_error(err.to_string())
            }
        }
    }
}

impl From<ApiError> for HandlerResponse {
    fn from(err: ApiError) -> Self {
        HandlerResponse::json(err.status_code(), err.to_json())
    }
}
