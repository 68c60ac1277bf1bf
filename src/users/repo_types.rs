use std::fmt;

use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// User record in the database.
#[derive(Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub user_name: String,
    pub password: String, // Argon2 PHC string
    pub full_name: String,
    pub nickname: Option<String>,
    pub date_created: OffsetDateTime,
}

// Keeps the hash out of logs and panic messages.
impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("user_name", &self.user_name)
            .field("password", &"[REDACTED]")
            .field("full_name", &self.full_name)
            .field("nickname", &self.nickname)
            .field("date_created", &self.date_created)
            .finish()
    }
}

/// Row to insert; `password` is already hashed.
#[derive(Clone)]
pub struct NewUser {
    pub user_name: String,
    pub password: String,
    pub full_name: String,
    pub nickname: Option<String>,
    pub date_created: OffsetDateTime,
}
