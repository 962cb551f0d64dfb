//! Repository for the `sessions` table.

use async_trait::async_trait;
use sqlx::PgPool;
use storefront_core::session::{NewSession, Session};
use storefront_core::store::{SessionStore, StoreResult};
use storefront_core::types::{SessionId, Timestamp};

use crate::error::classify_sqlx_error;
use crate::models::session::SessionRow;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, user_id, secret_hash, expires_at, created_at";

/// Refresh-secret store backed by PostgreSQL.
#[derive(Clone)]
pub struct SessionRepo {
    pool: PgPool,
}

impl SessionRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new session, returning the created row.
    pub async fn insert(pool: &PgPool, input: &NewSession) -> Result<SessionRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO sessions (id, user_id, secret_hash, expires_at)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, SessionRow>(&query)
            .bind(input.id)
            .bind(input.user_id)
            .bind(&input.secret_hash)
            .bind(input.expires_at)
            .fetch_one(pool)
            .await
    }

    /// Find a session by id, expired or not. Expiry is the caller's decision.
    pub async fn select_by_id(pool: &PgPool, id: SessionId) -> Result<Option<SessionRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM sessions WHERE id = $1");
        sqlx::query_as::<_, SessionRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Delete one session. Returns `true` if a row was removed.
    pub async fn delete_by_id(pool: &PgPool, id: SessionId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM sessions WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete sessions that expired at or before `now`. Returns the count of deleted rows.
    pub async fn cleanup_expired(pool: &PgPool, now: Timestamp) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= $1")
            .bind(now)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}

#[async_trait]
impl SessionStore for SessionRepo {
    async fn create(&self, input: NewSession) -> StoreResult<Session> {
        Self::insert(&self.pool, &input)
            .await
            .map(Session::from)
            .map_err(classify_sqlx_error)
    }

    async fn find_by_id(&self, id: SessionId) -> StoreResult<Option<Session>> {
        Self::select_by_id(&self.pool, id)
            .await
            .map(|row| row.map(Session::from))
            .map_err(classify_sqlx_error)
    }

    async fn delete(&self, id: SessionId) -> StoreResult<bool> {
        Self::delete_by_id(&self.pool, id)
            .await
            .map_err(classify_sqlx_error)
    }

    async fn delete_expired(&self, now: Timestamp) -> StoreResult<u64> {
        Self::cleanup_expired(&self.pool, now)
            .await
            .map_err(classify_sqlx_error)
    }
}
