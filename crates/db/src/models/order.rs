//! Order and order-line rows.

use sqlx::FromRow;
use storefront_core::error::StoreError;
use storefront_core::payment::{Order, OrderLine, OrderStatus};
use storefront_core::types::{OrderId, ProductId, Timestamp, UserId};

/// A row from the `orders` table, without its lines.
#[derive(Debug, Clone, FromRow)]
pub struct OrderRow {
    pub id: OrderId,
    pub user_id: UserId,
    pub payment_reference: String,
    pub status: String,
    pub total_minor: i64,
    pub currency: String,
    pub created_at: Timestamp,
}

impl OrderRow {
    /// Attach lines and parse the status column.
    pub fn into_order(self, lines: Vec<OrderLineRow>) -> Result<Order, StoreError> {
        let status = OrderStatus::parse(&self.status).ok_or_else(|| {
            StoreError::Backend(format!("order {} has unknown status '{}'", self.id, self.status))
        })?;
        Ok(Order {
            id: self.id,
            user_id: self.user_id,
            payment_reference: self.payment_reference,
            status,
            total_minor: self.total_minor,
            currency: self.currency,
            created_at: self.created_at,
            lines: lines.into_iter().map(OrderLine::from).collect(),
        })
    }
}

/// A row from the `order_lines` table.
#[derive(Debug, Clone, FromRow)]
pub struct OrderLineRow {
    pub order_id: OrderId,
    pub position: i32,
    pub product_id: ProductId,
    pub title: String,
    pub unit_price_minor: i64,
    pub quantity: i32,
    pub image_url: String,
}

impl From<OrderLineRow> for OrderLine {
    fn from(row: OrderLineRow) -> Self {
        Self {
            product_id: row.product_id,
            title: row.title,
            unit_price_minor: row.unit_price_minor,
            quantity: row.quantity,
            image_url: row.image_url,
        }
    }
}
