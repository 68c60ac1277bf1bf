use async_trait::async_trait;
use sqlx::PgPool;
use thiserror::Error;

use crate::users::repo_types::{NewUser, User};

// Postgres SQLSTATE for unique_violation.
const UNIQUE_VIOLATION: &str = "23505";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("user name `{0}` already exists")]
    DuplicateUserName(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// True iff a user with exactly this name exists.
    async fn exists_by_user_name(&self, user_name: &str) -> Result<bool, StoreError>;

    /// Insert a user and return the stored row.
    async fn insert(&self, user: NewUser) -> Result<User, StoreError>;
}

#[derive(Clone)]
pub struct PgUserStore {
    db: PgPool,
}

impl PgUserStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn exists_by_user_name(&self, user_name: &str) -> Result<bool, StoreError> {
        let exists = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM thingful_users WHERE user_name = $1
            )
            "#,
        )
        .bind(user_name)
        .fetch_one(&self.db)
        .await?;
        Ok(exists)
    }

    async fn insert(&self, user: NewUser) -> Result<User, StoreError> {
        let row = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO thingful_users (user_name, password, full_name, nickname, date_created)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, user_name, password, full_name, nickname, date_created
            "#,
        )
        .bind(&user.user_name)
        .bind(&user.password)
        .bind(&user.full_name)
        .bind(&user.nickname)
        .bind(user.date_created)
        .fetch_one(&self.db)
        .await;

        match row {
            Ok(row) => Ok(row),
            Err(sqlx::Error::Database(e)) if e.code().as_deref() == Some(UNIQUE_VIOLATION) => {
                Err(StoreError::DuplicateUserName(user.user_name))
            }
            Err(e) => Err(e.into()),
        }
    }
}


#[cfg(test)]
mod tests {
    use time::OffsetDateTime;

    use super::memory::MemoryUserStore;
    use super::*;

    fn new_user(name: &str) -> NewUser {
        NewUser {
            user_name: name.into(),
            password: "hash".into(),
            full_name: "Test User".into(),
            nickname: None,
            date_created: OffsetDateTime::now_utc(),
        }
    }

    #[tokio::test]
    async fn insert_then_exists() {
        let store = MemoryUserStore::default();
        assert!(!store.exists_by_user_name("dunder").await.unwrap());

        let stored = store.insert(new_user("dunder")).await.unwrap();
        assert_eq!(stored.user_name, "dunder");
        assert!(store.exists_by_user_name("dunder").await.unwrap());
    }

    #[tokio::test]
    async fn exists_matches_exact_name_only() {
        let store = MemoryUserStore::default();
        store.insert(new_user("dunder")).await.unwrap();
        assert!(!store.exists_by_user_name("Dunder").await.unwrap());
        assert!(!store.exists_by_user_name("dunder ").await.unwrap());
    }

    #[tokio::test]
    async fn duplicate_insert_is_rejected() {
        let store = MemoryUserStore::default();
        store.insert(new_user("dunder")).await.unwrap();
        let err = store.insert(new_user("dunder")).await.unwrap_err();
        assert!(matches!(err, StoreError::DuplicateUserName(name) if name == "dunder"));
        assert_eq!(store.rows().len(), 1);
    }
}
