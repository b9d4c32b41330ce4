use axum::http::{request::Parts, HeaderMap};
use serde_json::{Map, Value};
use std::collections::HashMap;

use super::format::parse_json_safe;

/// Normalized view of one request, handed to every handler
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    /// Path with leading and trailing slashes removed
    pub path: String,
    /// Lowercased method name
    pub method: String,
    pub query: HashMap<String, String>,
    /// Header names are lowercase; values that are not valid text are dropped
    pub headers: HashMap<String, String>,
    pub payload: Map<String, Value>,
}

impl RequestContext {
    pub fn from_parts(parts: &Parts, body: &[u8]) -> Self {
        Self {
            path: normalize_path(parts.uri.path()),
            method: parts.method.as_str().to_lowercase(),
            query: parse_query(parts.uri.query()),
            headers: header_map(&parts.headers),
            payload: parse_json_safe(body),
        }
    }

    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query.get(name).map(String::as_str)
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.payload.get(name)
    }
}

/// Strip every leading and trailing `/`
pub fn normalize_path(path: &str) -> String {
    path.trim_matches('/').to_string()
}

/// Flat string map; a repeated key keeps its last value
pub fn parse_query(query: Option<&str>) -> HashMap<String, String> {
    query
        .map(|q| {
            url::form_urlencoded::parse(q.as_bytes())
                .into_owned()
                .collect()
        })
        .unwrap_or_default()
}

fn header_map(headers: &HeaderMap) -> HashMap<String, String> {
    headers
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|v| (name.as_str().to_string(), v.to_string()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    #[test]
    fn path_normalization() {
        assert_eq!(normalize_path("/api/users/"), "api/users");
        assert_eq!(normalize_path("///ping//"), "ping");
        assert_eq!(normalize_path("/"), "");
        assert_eq!(normalize_path("api/tokens"), "api/tokens");
    }

    #[test]
    fn query_parsing() {
        let query = parse_query(Some("phone=1234567890&name=a%20b&phone=0987654321"));
        assert_eq!(query.get("phone").map(String::as_str), Some("0987654321"));
        assert_eq!(query.get("name").map(String::as_str), Some("a b"));
        assert!(parse_query(None).is_empty());
    }

    #[test]
    fn context_from_request_parts() {
        let request = Request::builder()
            .method("PUT")
            .uri("/api/users/?phone=1234567890")
            .header("Token", "abc")
            .body(())
            .unwrap();
        let (parts, _) = request.into_parts();

        let ctx = RequestContext::from_parts(&parts, br#"{"firstName":"A"}"#);
        assert_eq!(ctx.path, "api/users");
        assert_eq!(ctx.method, "put");
        assert_eq!(ctx.query_param("phone"), Some("1234567890"));
        assert_eq!(ctx.headers.get("token").map(String::as_str), Some("abc"));
        assert_eq!(ctx.field("firstName"), Some(&Value::from("A")));
    }

    #[test]
    fn malformed_body_becomes_empty_payload() {
        let (parts, _) = Request::builder().uri("/ping").body(()).unwrap().into_parts();
        let ctx = RequestContext::from_parts(&parts, b"not json");
        assert!(ctx.payload.is_empty());
    }
}
