use serde_json::{Map, Value};

/// Decode a request body into a JSON object.
///
/// Never fails: malformed input, an empty body, or any JSON value that is not an
/// object all come back as an empty map.
pub fn parse_json_safe(body: &[u8]) -> Map<String, Value> {
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) => map,
        _ => Map::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn objects_are_returned() {
        let map = parse_json_safe(br#"{"phone": "1234567890", "extend": true}"#);
        assert_eq!(map.get("phone"), Some(&json!("1234567890")));
        assert_eq!(map.get("extend"), Some(&json!(true)));
    }

    #[test]
    fn everything_else_is_empty() {
        let bodies: [&[u8]; 7] = [b"", b"{", b"null", b"[1,2]", b"\"text\"", b"42", b"\xff\xfe"];
        for body in bodies {
            assert!(parse_json_safe(body).is_empty(), "body {:?}", body);
        }
    }
}
