use std::sync::Arc;

use crate::error::{CoreError, CoreResult};
use crate::payment::model::Order;
use crate::store::OrderStore;
use crate::types::{OrderId, UserId};

/// Read access to a user's own orders.
pub struct OrderService {
    orders: Arc<dyn OrderStore>,
}

impl OrderService {
    pub fn new(orders: Arc<dyn OrderStore>) -> Self {
        Self { orders }
    }

    /// All orders owned by `user_id`, newest first.
    pub async fn list_for_user(&self, user_id: UserId) -> CoreResult<Vec<Order>> {
        Ok(self.orders.list_for_user(user_id).await?)
    }

    /// One order, reported as not found unless `user_id` owns it.
    pub async fn get_for_user(&self, order_id: OrderId, user_id: UserId) -> CoreResult<Order> {
        self.orders
            .find_by_id(order_id)
            .await?
            .filter(|order| order.user_id == user_id)
            .ok_or_else(|| CoreError::not_found("order", order_id))
    }
}
