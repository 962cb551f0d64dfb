//! Cart item row.

use sqlx::FromRow;
use storefront_core::types::{ProductId, UserId};

/// A row from the `cart_items` table. Pricing is not stored; it is resolved
/// against the catalog when the cart is read.
#[derive(Debug, Clone, FromRow)]
pub struct CartItemRow {
    pub user_id: UserId,
    pub product_id: ProductId,
    pub quantity: i32,
}
