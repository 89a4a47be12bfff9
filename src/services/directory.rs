//! Postgres-backed profile directory and ban list.

#[cfg(test)]
#[path = "directory_test.rs"]
mod tests;

use gate::{BanList, LookupError, Profile, ProfileDirectory};
use sqlx::{PgPool, Row};
use uuid::Uuid;

pub struct PgDirectory {
    pool: PgPool,
}

impl PgDirectory {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

pub(crate) fn db_error(e: sqlx::Error) -> LookupError {
    match e {
        sqlx::Error::PoolTimedOut => LookupError::Timeout,
        other => LookupError::Database(other.to_string()),
    }
}

pub(crate) fn parse_user_id(raw: &str) -> Result<Uuid, LookupError> {
    Uuid::parse_str(raw).map_err(|_| LookupError::Decode(format!("user id is not a uuid: {raw}")))
}

#[async_trait::async_trait]
impl ProfileDirectory for PgDirectory {
    async fn find_by_user(&self, user_id: &str) -> Result<Option<Profile>, LookupError> {
        let uid = parse_user_id(user_id)?;
        let row = sqlx::query(
            r"SELECT id, user_id, is_author, role
              FROM profiles
              WHERE user_id = $1
              ORDER BY created_at
              LIMIT 1",
        )
        .bind(uid)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;

        let Some(row) = row else {
            return Ok(None);
        };
        let id: Uuid = row.try_get("id").map_err(db_error)?;
        let owner: Uuid = row.try_get("user_id").map_err(db_error)?;
        Ok(Some(Profile {
            id: id.to_string(),
            user_id: owner.to_string(),
            is_author: row.try_get("is_author").map_err(db_error)?,
            role: row.try_get("role").map_err(db_error)?,
        }))
    }
}

#[async_trait::async_trait]
impl BanList for PgDirectory {
    async fn is_banned(&self, email_lower: &str) -> Result<bool, LookupError> {
        let row = sqlx::query("SELECT EXISTS (SELECT 1 FROM banned_users WHERE lower(email) = $1) AS banned")
            .bind(email_lower)
            .fetch_one(&self.pool)
            .await
            .map_err(db_error)?;
        row.try_get("banned").map_err(db_error)
    }
}
