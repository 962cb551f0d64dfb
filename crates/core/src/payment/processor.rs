//! Idempotent order materialization.
//!
//! Per payment reference the order moves `none -> paid` or `none -> failed`
//! and then stays put: repeated deliveries are no-ops, a failure after
//! `paid` is ignored, and a success after `failed` is ignored. A `pending`
//! row left by an interrupted earlier attempt is completed in place.

use std::sync::Arc;

use crate::error::{CoreError, CoreResult, StoreError};
use crate::payment::event::PaymentEvent;
use crate::payment::locks::ReferenceLocks;
use crate::payment::model::{NewOrder, Order, OrderLine, OrderStatus};
use crate::payment::pricing::to_minor_units;
use crate::store::{CartProvider, CatalogProvider, OrderStore};
use crate::types::{OrderId, UserId};

/// Currency code stamped on new orders unless configured otherwise.
pub const DEFAULT_CURRENCY: &str = "usd";

/// What a success event did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Materialization {
    /// A new paid order was inserted and the cart cleared.
    Created { order_id: OrderId },
    /// A non-paid order for the reference was completed in place.
    Completed { order_id: OrderId },
    /// A terminal order already exists; nothing changed.
    AlreadySettled {
        order_id: OrderId,
        status: OrderStatus,
    },
    /// No order exists and the cart is empty; nothing changed.
    EmptyCart,
}

/// What a failure event did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureOutcome {
    /// No order exists for the reference (or the reference is empty).
    NoOrder,
    MarkedFailed { order_id: OrderId },
    /// The order is already terminal (`paid` or `failed`); left untouched.
    AlreadySettled {
        order_id: OrderId,
        status: OrderStatus,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventOutcome {
    Success(Materialization),
    Failure(FailureOutcome),
}

/// Consumes verified payment events and materializes orders.
pub struct PaymentEventProcessor {
    orders: Arc<dyn OrderStore>,
    cart: Arc<dyn CartProvider>,
    catalog: Arc<dyn CatalogProvider>,
    currency: String,
    locks: ReferenceLocks,
}

impl PaymentEventProcessor {
    pub fn new(
        orders: Arc<dyn OrderStore>,
        cart: Arc<dyn CartProvider>,
        catalog: Arc<dyn CatalogProvider>,
    ) -> Self {
        Self {
            orders,
            cart,
            catalog,
            currency: DEFAULT_CURRENCY.to_string(),
            locks: ReferenceLocks::new(),
        }
    }

    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into();
        self
    }

    /// Dispatch one verified event.
    pub async fn handle(&self, event: &PaymentEvent) -> CoreResult<EventOutcome> {
        match event {
            PaymentEvent::Succeeded {
                payment_reference,
                user_id,
            } => self
                .materialize_on_success(payment_reference, *user_id)
                .await
                .map(EventOutcome::Success),
            PaymentEvent::Failed { payment_reference } => self
                .materialize_on_failure(payment_reference)
                .await
                .map(EventOutcome::Failure),
        }
    }

    /// Materialize the user's cart as the paid order for `payment_reference`.
    pub async fn materialize_on_success(
        &self,
        payment_reference: &str,
        user_id: UserId,
    ) -> CoreResult<Materialization> {
        if payment_reference.is_empty() {
            return Err(CoreError::MissingReference);
        }
        if user_id.is_nil() {
            return Err(CoreError::MissingUser);
        }

        let _guard = self.locks.acquire(payment_reference).await;

        let existing = self.orders.find_by_reference(payment_reference).await?;
        if let Some(order) = existing.as_ref().filter(|o| is_terminal_for_success(o)) {
            tracing::info!(
                payment_reference,
                order_id = %order.id,
                status = %order.status,
                "Duplicate success delivery; order already settled"
            );
            return Ok(Materialization::AlreadySettled {
                order_id: order.id,
                status: order.status,
            });
        }

        let lines = self.snapshot_cart(user_id).await?;
        if lines.is_empty() {
            tracing::info!(payment_reference, user_id = %user_id, "Cart empty; nothing to materialize");
            return Ok(Materialization::EmptyCart);
        }
        let total_minor = order_total_minor(&lines).ok_or_else(|| {
            CoreError::Internal(format!(
                "order total for {payment_reference} overflows minor units"
            ))
        })?;

        let outcome = match existing {
            Some(order) => self.complete(order, lines, total_minor).await?,
            None => {
                let input = NewOrder {
                    user_id,
                    payment_reference: payment_reference.to_string(),
                    status: OrderStatus::Paid,
                    total_minor,
                    currency: self.currency.clone(),
                    lines: lines.clone(),
                };
                match self.orders.create(input).await {
                    Ok(order) => Materialization::Created { order_id: order.id },
                    Err(StoreError::UniqueViolation(constraint)) => {
                        // Another writer inserted first; defer to what it left.
                        tracing::info!(
                            payment_reference,
                            constraint = %constraint,
                            "Lost order insert race; re-reading"
                        );
                        let order = self
                            .orders
                            .find_by_reference(payment_reference)
                            .await?
                            .ok_or(StoreError::UniqueViolation(constraint))?;
                        if is_terminal_for_success(&order) {
                            return Ok(Materialization::AlreadySettled {
                                order_id: order.id,
                                status: order.status,
                            });
                        }
                        self.complete(order, lines, total_minor).await?
                    }
                    Err(e) => return Err(e.into()),
                }
            }
        };

        self.cart.clear(user_id).await?;

        tracing::info!(payment_reference, user_id = %user_id, total_minor, outcome = ?outcome, "Order materialized");
        Ok(outcome)
    }

    /// Record a failed payment for `payment_reference`.
    ///
    /// Never reverses a paid order and never creates one.
    pub async fn materialize_on_failure(
        &self,
        payment_reference: &str,
    ) -> CoreResult<FailureOutcome> {
        if payment_reference.is_empty() {
            return Ok(FailureOutcome::NoOrder);
        }

        let _guard = self.locks.acquire(payment_reference).await;

        let Some(mut order) = self.orders.find_by_reference(payment_reference).await? else {
            tracing::debug!(payment_reference, "Failure event for unknown reference");
            return Ok(FailureOutcome::NoOrder);
        };

        match order.status {
            OrderStatus::Failed => Ok(FailureOutcome::AlreadySettled {
                order_id: order.id,
                status: order.status,
            }),
            OrderStatus::Paid => {
                tracing::warn!(
                    payment_reference,
                    order_id = %order.id,
                    "Ignoring failure event for a paid order"
                );
                Ok(FailureOutcome::AlreadySettled {
                    order_id: order.id,
                    status: order.status,
                })
            }
            OrderStatus::Pending => {
                order.status = OrderStatus::Failed;
                self.orders.update(&order).await?;
                tracing::info!(payment_reference, order_id = %order.id, "Order marked failed");
                Ok(FailureOutcome::MarkedFailed { order_id: order.id })
            }
        }
    }

    /// Resolve every cart line against the catalog into a price snapshot.
    async fn snapshot_cart(&self, user_id: UserId) -> CoreResult<Vec<OrderLine>> {
        let cart = self.cart.lines(user_id).await?;
        let mut lines = Vec::with_capacity(cart.len());
        for item in cart {
            let product = self
                .catalog
                .product(item.product_id)
                .await?
                .ok_or_else(|| CoreError::not_found("product", item.product_id))?;
            lines.push(OrderLine {
                product_id: product.id,
                title: product.title,
                unit_price_minor: to_minor_units(product.price),
                quantity: item.quantity,
                image_url: product.image_url,
            });
        }
        Ok(lines)
    }

    /// Mark a non-paid order paid, filling only what it is missing.
    async fn complete(
        &self,
        mut order: Order,
        lines: Vec<OrderLine>,
        total_minor: i64,
    ) -> CoreResult<Materialization> {
        order.status = OrderStatus::Paid;
        if order.total_minor == 0 {
            order.total_minor = total_minor;
        }
        if order.currency.is_empty() {
            order.currency = self.currency.clone();
        }
        if order.lines.is_empty() {
            order.lines = lines;
        }
        self.orders.update(&order).await?;
        Ok(Materialization::Completed { order_id: order.id })
    }
}

/// Sum of line totals; `None` on overflow.
fn order_total_minor(lines: &[OrderLine]) -> Option<i64> {
    lines
        .iter()
        .try_fold(0i64, |acc, line| acc.checked_add(line.line_total_minor()?))
}

/// A success event only acts on a missing or `pending` order.
fn is_terminal_for_success(order: &Order) -> bool {
    matches!(order.status, OrderStatus::Paid | OrderStatus::Failed)
}
