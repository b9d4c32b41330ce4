// Input validation shared by the resource handlers. Each check yields the
// trimmed value on success so handlers never persist surrounding whitespace.
use serde_json::Value;

/// Phone numbers are exactly this many characters after trimming
pub const PHONE_LENGTH: usize = 10;

/// A string that is non-empty after trimming
pub fn non_empty_string(value: Option<&Value>) -> Option<String> {
    value.and_then(Value::as_str).and_then(non_empty)
}

pub fn phone(value: Option<&Value>) -> Option<String> {
    value.and_then(Value::as_str).and_then(phone_param)
}

pub fn phone_param(value: &str) -> Option<String> {
    exact_length(value, PHONE_LENGTH)
}

/// Token ids must match the configured id length
pub fn token_id(value: Option<&Value>, length: usize) -> Option<String> {
    value.and_then(Value::as_str).and_then(|v| exact_length(v, length))
}

pub fn token_id_param(value: &str, length: usize) -> Option<String> {
    exact_length(value, length)
}

/// Only a literal JSON `true` counts as agreement
pub fn affirmative(value: Option<&Value>) -> bool {
    matches!(value, Some(Value::Bool(true)))
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn exact_length(value: &str, length: usize) -> Option<String> {
    let trimmed = value.trim();
    (trimmed.chars().count() == length).then(|| trimmed.to_string())
}
