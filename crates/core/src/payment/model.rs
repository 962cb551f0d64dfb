//! Order, cart and catalog shapes used by materialization.

use serde::{Deserialize, Serialize};

use crate::types::{OrderId, ProductId, Timestamp, UserId};

/// Lifecycle of an order keyed by its payment reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Paid,
    Failed,
}

impl OrderStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
            Self::Failed => "failed",
        }
    }

    /// Parse the persisted status name.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(Self::Pending),
            "paid" => Some(Self::Paid),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot of a purchased product at confirmation time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub product_id: ProductId,
    pub title: String,
    pub unit_price_minor: i64,
    pub quantity: i32,
    pub image_url: String,
}

impl OrderLine {
    /// Unit price times quantity, or `None` when it does not fit in `i64`.
    pub fn line_total_minor(&self) -> Option<i64> {
        self.unit_price_minor
            .checked_mul(i64::from(self.quantity))
            .map(|total| total.max(0))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub payment_reference: String,
    pub status: OrderStatus,
    pub total_minor: i64,
    pub currency: String,
    pub created_at: Timestamp,
    pub lines: Vec<OrderLine>,
}

#[derive(Debug, Clone)]
pub struct NewOrder {
    pub user_id: UserId,
    pub payment_reference: String,
    pub status: OrderStatus,
    pub total_minor: i64,
    pub currency: String,
    pub lines: Vec<OrderLine>,
}

/// One line of a user's cart, already resolved against the catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct CartLine {
    pub product_id: ProductId,
    pub quantity: i32,
    /// Decimal major units, as the catalog reports them.
    pub unit_price: f64,
    pub title: String,
    pub image_url: String,
}

/// Catalog entry.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub title: String,
    /// Decimal major units.
    pub price: f64,
    #[serde(rename = "image", default)]
    pub image_url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(unit_price_minor: i64, quantity: i32) -> OrderLine {
        OrderLine {
            product_id: 1,
            title: "Mug".to_string(),
            unit_price_minor,
            quantity,
            image_url: String::new(),
        }
    }

    #[test]
    fn test_line_total_multiplies_price_by_quantity() {
        assert_eq!(line(1999, 3).line_total_minor(), Some(5997));
    }

    #[test]
    fn test_line_total_overflow_is_none() {
        assert_eq!(line(100_000_000_000_000_000, 200).line_total_minor(), None);
        assert_eq!(line(i64::MAX, 2).line_total_minor(), None);
    }
}
