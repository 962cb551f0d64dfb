//! Collaborator ports.
//!
//! The services in this crate reach persistence and upstream providers only
//! through these traits. Lookups return `Ok(None)` for "not found"; an `Err`
//! always means the collaborator itself failed.

use async_trait::async_trait;

use crate::error::StoreError;
use crate::payment::model::{CartLine, NewOrder, Order, Product};
use crate::session::{NewSession, Session};
use crate::types::{OrderId, ProductId, SessionId, Timestamp, UserId};
use crate::user::{NewUser, User};

pub type StoreResult<T> = Result<T, StoreError>;

/// Identity store.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a user. A taken email yields [`StoreError::UniqueViolation`].
    async fn create(&self, input: NewUser) -> StoreResult<User>;

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    async fn find_by_id(&self, id: UserId) -> StoreResult<Option<User>>;
}

/// Refresh-secret store, keyed by session id.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn create(&self, input: NewSession) -> StoreResult<Session>;

    async fn find_by_id(&self, id: SessionId) -> StoreResult<Option<Session>>;

    /// Delete a session. Returns `false` when nothing was deleted.
    async fn delete(&self, id: SessionId) -> StoreResult<bool>;

    /// Delete every session whose expiry is at or before `now`.
    async fn delete_expired(&self, now: Timestamp) -> StoreResult<u64>;
}

/// Order store. The payment reference is unique across all orders.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Insert an order together with its lines, atomically.
    ///
    /// A reference that already has an order yields
    /// [`StoreError::UniqueViolation`] and writes nothing.
    async fn create(&self, input: NewOrder) -> StoreResult<Order>;

    async fn find_by_id(&self, id: OrderId) -> StoreResult<Option<Order>>;

    async fn find_by_reference(&self, payment_reference: &str) -> StoreResult<Option<Order>>;

    /// Newest first.
    async fn list_for_user(&self, user_id: UserId) -> StoreResult<Vec<Order>>;

    /// Replace an existing order (status, totals and lines) atomically.
    async fn update(&self, order: &Order) -> StoreResult<()>;
}

/// Live view of a user's cart.
#[async_trait]
pub trait CartProvider: Send + Sync {
    async fn lines(&self, user_id: UserId) -> StoreResult<Vec<CartLine>>;

    async fn clear(&self, user_id: UserId) -> StoreResult<()>;
}

/// Authoritative current pricing.
#[async_trait]
pub trait CatalogProvider: Send + Sync {
    async fn product(&self, id: ProductId) -> StoreResult<Option<Product>>;
}
