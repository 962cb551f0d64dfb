//! Repository for the `orders` and `order_lines` tables.
//!
//! An order and its lines are always written in one transaction, so a
//! dropped request never leaves an order with half of its lines.

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use storefront_core::error::StoreError;
use storefront_core::payment::{NewOrder, Order, OrderLine};
use storefront_core::store::{OrderStore, StoreResult};
use storefront_core::types::{OrderId, UserId};

use crate::error::classify_sqlx_error;
use crate::models::order::{OrderLineRow, OrderRow};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, user_id, payment_reference, status, total_minor, currency, created_at";

const LINE_COLUMNS: &str =
    "order_id, position, product_id, title, unit_price_minor, quantity, image_url";

/// Order store backed by PostgreSQL.
#[derive(Clone)]
pub struct OrderRepo {
    pool: PgPool,
}

impl OrderRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert an order and its lines. A reused payment reference violates
    /// `uq_orders_payment_reference` and rolls the whole write back.
    pub async fn insert(pool: &PgPool, input: &NewOrder) -> Result<(OrderRow, Vec<OrderLineRow>), sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO orders (id, user_id, payment_reference, status, total_minor, currency)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        let order = sqlx::query_as::<_, OrderRow>(&query)
            .bind(uuid::Uuid::new_v4())
            .bind(input.user_id)
            .bind(&input.payment_reference)
            .bind(input.status.as_str())
            .bind(input.total_minor)
            .bind(&input.currency)
            .fetch_one(&mut *tx)
            .await?;

        let lines = Self::replace_lines_inner(&mut tx, order.id, &input.lines).await?;

        tx.commit().await?;
        Ok((order, lines))
    }

    /// Overwrite status, totals and lines of an existing order.
    ///
    /// Returns `false` when no order has the given id.
    pub async fn replace(pool: &PgPool, order: &Order) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let result = sqlx::query(
            "UPDATE orders SET status = $2, total_minor = $3, currency = $4
             WHERE id = $1",
        )
        .bind(order.id)
        .bind(order.status.as_str())
        .bind(order.total_minor)
        .bind(&order.currency)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(false);
        }

        Self::replace_lines_inner(&mut tx, order.id, &order.lines).await?;

        tx.commit().await?;
        Ok(true)
    }

    pub async fn select_by_id(pool: &PgPool, id: OrderId) -> Result<Option<OrderRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM orders WHERE id = $1");
        sqlx::query_as::<_, OrderRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn select_by_reference(
        pool: &PgPool,
        payment_reference: &str,
    ) -> Result<Option<OrderRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM orders WHERE payment_reference = $1");
        sqlx::query_as::<_, OrderRow>(&query)
            .bind(payment_reference)
            .fetch_optional(pool)
            .await
    }

    /// All orders for a user, newest first.
    pub async fn select_for_user(pool: &PgPool, user_id: UserId) -> Result<Vec<OrderRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM orders WHERE user_id = $1 ORDER BY created_at DESC, id"
        );
        sqlx::query_as::<_, OrderRow>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Lines for a set of orders, in position order.
    pub async fn select_lines(pool: &PgPool, order_ids: &[OrderId]) -> Result<Vec<OrderLineRow>, sqlx::Error> {
        let query = format!(
            "SELECT {LINE_COLUMNS} FROM order_lines
             WHERE order_id = ANY($1)
             ORDER BY order_id, position"
        );
        sqlx::query_as::<_, OrderLineRow>(&query)
            .bind(order_ids)
            .fetch_all(pool)
            .await
    }

    /// Delete then re-insert the lines of an order within the caller's transaction.
    async fn replace_lines_inner(
        tx: &mut Transaction<'_, Postgres>,
        order_id: OrderId,
        lines: &[OrderLine],
    ) -> Result<Vec<OrderLineRow>, sqlx::Error> {
        sqlx::query("DELETE FROM order_lines WHERE order_id = $1")
            .bind(order_id)
            .execute(&mut **tx)
            .await?;

        let query = format!(
            "INSERT INTO order_lines (id, {LINE_COLUMNS})
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {LINE_COLUMNS}"
        );
        let mut rows = Vec::with_capacity(lines.len());
        for (position, line) in lines.iter().enumerate() {
            let row = sqlx::query_as::<_, OrderLineRow>(&query)
                .bind(uuid::Uuid::new_v4())
                .bind(order_id)
                .bind(position as i32)
                .bind(line.product_id)
                .bind(&line.title)
                .bind(line.unit_price_minor)
                .bind(line.quantity)
                .bind(&line.image_url)
                .fetch_one(&mut **tx)
                .await?;
            rows.push(row);
        }
        Ok(rows)
    }

    async fn hydrate(&self, row: OrderRow) -> StoreResult<Order> {
        let lines = Self::select_lines(&self.pool, &[row.id])
            .await
            .map_err(classify_sqlx_error)?;
        row.into_order(lines)
    }
}

#[async_trait]
impl OrderStore for OrderRepo {
    async fn create(&self, input: NewOrder) -> StoreResult<Order> {
        let (order, lines) = Self::insert(&self.pool, &input)
            .await
            .map_err(classify_sqlx_error)?;
        order.into_order(lines)
    }

    async fn find_by_id(&self, id: OrderId) -> StoreResult<Option<Order>> {
        match Self::select_by_id(&self.pool, id)
            .await
            .map_err(classify_sqlx_error)?
        {
            Some(row) => self.hydrate(row).await.map(Some),
            None => Ok(None),
        }
    }

    async fn find_by_reference(&self, payment_reference: &str) -> StoreResult<Option<Order>> {
        match Self::select_by_reference(&self.pool, payment_reference)
            .await
            .map_err(classify_sqlx_error)?
        {
            Some(row) => self.hydrate(row).await.map(Some),
            None => Ok(None),
        }
    }

    async fn list_for_user(&self, user_id: UserId) -> StoreResult<Vec<Order>> {
        let rows = Self::select_for_user(&self.pool, user_id)
            .await
            .map_err(classify_sqlx_error)?;
        let ids: Vec<OrderId> = rows.iter().map(|r| r.id).collect();
        let mut lines_by_order: HashMap<OrderId, Vec<OrderLineRow>> = HashMap::new();
        for line in Self::select_lines(&self.pool, &ids)
            .await
            .map_err(classify_sqlx_error)?
        {
            lines_by_order.entry(line.order_id).or_default().push(line);
        }

        rows.into_iter()
            .map(|row| {
                let lines = lines_by_order.remove(&row.id).unwrap_or_default();
                row.into_order(lines)
            })
            .collect()
    }

    async fn update(&self, order: &Order) -> StoreResult<()> {
        if Self::replace(&self.pool, order)
            .await
            .map_err(classify_sqlx_error)?
        {
            Ok(())
        } else {
            Err(StoreError::Backend(format!("order {} does not exist", order.id)))
        }
    }
}
