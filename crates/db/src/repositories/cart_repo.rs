//! Repository for the `cart_items` table.

use sqlx::PgPool;
use storefront_core::types::{ProductId, UserId};

use crate::models::cart::CartItemRow;

/// Persisted cart contents. Pricing is joined in by the cart provider.
#[derive(Clone)]
pub struct CartRepo {
    pool: PgPool,
}

impl CartRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Items in the user's cart in insertion order.
    pub async fn items(&self, user_id: UserId) -> Result<Vec<CartItemRow>, sqlx::Error> {
        sqlx::query_as::<_, CartItemRow>(
            "SELECT user_id, product_id, quantity FROM cart_items
             WHERE user_id = $1
             ORDER BY created_at, id",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
    }

    /// Add `quantity` of a product, summing with any existing line.
    pub async fn add_item(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: i32,
    ) -> Result<CartItemRow, sqlx::Error> {
        sqlx::query_as::<_, CartItemRow>(
            "INSERT INTO cart_items (id, user_id, product_id, quantity)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT (user_id, product_id)
             DO UPDATE SET quantity = cart_items.quantity + EXCLUDED.quantity
             RETURNING user_id, product_id, quantity",
        )
        .bind(uuid::Uuid::new_v4())
        .bind(user_id)
        .bind(product_id)
        .bind(quantity)
        .fetch_one(&self.pool)
        .await
    }

    /// Remove every line for the user. Returns the count of deleted rows.
    pub async fn clear(&self, user_id: UserId) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM cart_items WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
