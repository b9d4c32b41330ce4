use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Resource type (store subdirectory) for users
pub const USERS: &str = "users";

/// A registered user, keyed by phone number.
///
/// Only the keyed hash of the password is ever persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub hashed_password: String,
    pub tos_agreement: bool,
}

impl User {
    /// Wire representation with the password hash removed
    pub fn public_view(&self) -> Value {
        let mut value = serde_json::to_value(self).unwrap_or_default();
        if let Some(map) = value.as_object_mut() {
            map.remove("hashedPassword");
        }
        value
    }
}
