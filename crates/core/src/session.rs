//! Long-lived login sessions backing refresh credentials.

use crate::types::{SessionId, Timestamp, UserId};

/// One login session. Only the hash of the refresh secret is kept.
#[derive(Debug, Clone)]
pub struct Session {
    pub id: SessionId,
    pub user_id: UserId,
    pub secret_hash: String,
    pub expires_at: Timestamp,
    pub created_at: Timestamp,
}

impl Session {
    /// A session is usable strictly before its expiry instant.
    pub fn is_expired_at(&self, now: Timestamp) -> bool {
        self.expires_at <= now
    }
}

/// Input for persisting a new session. The id is generated by the caller.
#[derive(Debug, Clone)]
pub struct NewSession {
    pub id: SessionId,
    pub user_id: UserId,
    pub secret_hash: String,
    pub expires_at: Timestamp,
}
