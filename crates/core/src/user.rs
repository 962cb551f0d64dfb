//! Identity records.

use serde::Serialize;

use crate::types::{Timestamp, UserId};

/// A stored identity, including its password hash.
///
/// Never serialize this to a client; use [`UserProfile`].
#[derive(Debug, Clone)]
pub struct User {
    pub id: UserId,
    /// Unique, compared case-sensitively as stored.
    pub email: String,
    pub password_hash: String,
    pub full_name: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Input for creating a user. The password is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub full_name: String,
}

/// Public view of a user with the password hash omitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserProfile {
    pub id: UserId,
    pub email: String,
    pub full_name: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            full_name: user.full_name,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}
