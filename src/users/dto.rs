use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::users::repo_types::User;

/// Request body for user registration. Fields stay untyped JSON so the
/// handler can report a missing (absent or falsy) field by name before any
/// type checking happens.
#[derive(Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub user_name: Value,
    #[serde(default)]
    pub password: Value,
    #[serde(default)]
    pub full_name: Value,
    #[serde(default)]
    pub nickname: Value,
}

/// `null`, `false`, `0` and `""` count as absent.
pub fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

/// Public part of the user returned to the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublicUser {
    pub id: Uuid,
    pub user_name: String,
    pub full_name: String,
    pub nickname: String,
    #[serde(with = "time::serde::rfc3339")]
    pub date_created: OffsetDateTime,
}

impl From<&User> for PublicUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            user_name: user.user_name.clone(),
            full_name: user.full_name.clone(),
            nickname: user.nickname.clone().unwrap_or_default(),
            date_created: user.date_created,
        }
    }
}
