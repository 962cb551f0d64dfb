//! Repository for the `users` table.

use async_trait::async_trait;
use sqlx::PgPool;
use storefront_core::store::{StoreResult, UserStore};
use storefront_core::types::UserId;
use storefront_core::user::{NewUser, User};

use crate::error::classify_sqlx_error;
use crate::models::user::UserRow;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, email, password_hash, full_name, created_at, updated_at";

/// Identity store backed by PostgreSQL.
#[derive(Clone)]
pub struct UserRepo {
    pool: PgPool,
}

impl UserRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new user, returning the created row.
    ///
    /// A taken email violates `uq_users_email`.
    pub async fn insert(pool: &PgPool, input: &NewUser) -> Result<UserRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (id, email, password_hash, full_name)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, UserRow>(&query)
            .bind(uuid::Uuid::new_v4())
            .bind(&input.email)
            .bind(&input.password_hash)
            .bind(&input.full_name)
            .fetch_one(pool)
            .await
    }

    /// Find a user by exact email.
    pub async fn select_by_email(pool: &PgPool, email: &str) -> Result<Option<UserRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE email = $1");
        sqlx::query_as::<_, UserRow>(&query)
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    pub async fn select_by_id(pool: &PgPool, id: UserId) -> Result<Option<UserRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, UserRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}

#[async_trait]
impl UserStore for UserRepo {
    async fn create(&self, input: NewUser) -> StoreResult<User> {
        Self::insert(&self.pool, &input)
            .await
            .map(User::from)
            .map_err(classify_sqlx_error)
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        Self::select_by_email(&self.pool, email)
            .await
            .map(|row| row.map(User::from))
            .map_err(classify_sqlx_error)
    }

    async fn find_by_id(&self, id: UserId) -> StoreResult<Option<User>> {
        Self::select_by_id(&self.pool, id)
            .await
            .map(|row| row.map(User::from))
            .map_err(classify_sqlx_error)
    }
}
