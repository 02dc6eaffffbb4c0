use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};

/// Server-side session row holding the bearer credential for a signed-in user.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub access_token: String,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Session {
    /// A session with no expiry is treated as valid.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| at < now)
    }

    pub async fn find_by_id(pool: &SqlitePool, id: &str) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as(
            r#"SELECT id, access_token, expires_at, created_at
            FROM sessions
            WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    pub async fn create(
        pool: &SqlitePool,
        id: &str,
        access_token: &str,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as(
            r#"INSERT INTO sessions (id, access_token, expires_at)
            VALUES ($1, $2, $3)
            RETURNING id, access_token, expires_at, created_at"#,
        )
        .bind(id)
        .bind(access_token)
        .bind(expires_at)
        .fetch_one(pool)
        .await
    }
}
