use axum::{
    body::Body,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use serde_json::{Map, Value};

/// Content types a handler can answer with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContentType {
    #[default]
    Json,
    Html,
    Css,
    Favicon,
    Png,
    Jpg,
    Plain,
}

impl ContentType {
    pub fn mime(&self) -> &'static str {
        match self {
            ContentType::Json => "application/json",
            ContentType::Html => "text/html",
            ContentType::Css => "text/css",
            ContentType::Favicon => "image/x-icon",
            ContentType::Png => "image/png",
            ContentType::Jpg => "image/jpeg",
            ContentType::Plain => "text/plain",
        }
    }

    /// Guess from a file extension; unknown extensions are served as plain text
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_ascii_lowercase().as_str() {
            "html" | "htm" => ContentType::Html,
            "css" => ContentType::Css,
            "ico" => ContentType::Favicon,
            "png" => ContentType::Png,
            "jpg" | "jpeg" => ContentType::Jpg,
            _ => ContentType::Plain,
        }
    }
}

/// Body produced by a handler before content-type specific serialization
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Payload {
    #[default]
    Empty,
    Json(Value),
    Text(String),
    Bytes(Vec<u8>),
}

/// The single result of a handler invocation.
///
/// Returned by value, so a handler completes exactly once.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HandlerResponse {
    /// `None` is answered as 200
    pub status: Option<u16>,
    pub payload: Payload,
    pub content_type: ContentType,
}

impl HandlerResponse {
    pub fn new(status: Option<u16>, payload: Payload, content_type: ContentType) -> Self {
        Self {
            status,
            payload,
            content_type,
        }
    }

    pub fn json(status: u16, value: Value) -> Self {
        Self::new(Some(status), Payload::Json(value), ContentType::Json)
    }

    /// 200 with a JSON body
    pub fn ok(value: Value) -> Self {
        Self::json(200, value)
    }

    /// Status only; the body serializes as `{}`
    pub fn status(status: u16) -> Self {
        Self::new(Some(status), Payload::Empty, ContentType::Json)
    }

    pub fn status_code(&self) -> StatusCode {
        match self.status {
            None => StatusCode::OK,
            Some(code) => StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        }
    }

    /// Serialize the payload according to the content type
    pub fn body_bytes(&self) -> Vec<u8> {
        match self.content_type {
            ContentType::Json => {
                let value = match &self.payload {
                    Payload::Json(v @ (Value::Object(_) | Value::Array(_))) => v.clone(),
                    _ => Value::Object(Map::new()),
                };
                serde_json::to_vec(&value).unwrap_or_else(|_| b"{}".to_vec())
            }
            ContentType::Html | ContentType::Plain => match &self.payload {
                Payload::Text(text) => text.clone().into_bytes(),
                Payload::Bytes(bytes) => bytes.clone(),
                _ => Vec::new(),
            },
            ContentType::Css | ContentType::Favicon | ContentType::Png | ContentType::Jpg => {
                match &self.payload {
                    Payload::Bytes(bytes) => bytes.clone(),
                    Payload::Text(text) => text.clone().into_bytes(),
                    _ => Vec::new(),
                }
            }
        }
    }
}

impl IntoResponse for HandlerResponse {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = self.body_bytes();

        let mut response = Response::new(Body::from(body));
        *response.status_mut() = status;
        response.headers_mut().insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static(self.content_type.mime()),
        );
        response
    }
}
