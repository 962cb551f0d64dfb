//! Session row.

use sqlx::FromRow;
use storefront_core::session::Session;
use storefront_core::types::{SessionId, Timestamp, UserId};

/// A row from the `sessions` table. Only the hash of the secret is stored.
#[derive(Debug, Clone, FromRow)]
pub struct SessionRow {
    pub id: SessionId,
    pub user_id: UserId,
    pub secret_hash: String,
    pub expires_at: Timestamp,
    pub created_at: Timestamp,
}

impl From<SessionRow> for Session {
    fn from(row: SessionRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            secret_hash: row.secret_hash,
            expires_at: row.expires_at,
            created_at: row.created_at,
        }
    }
}
