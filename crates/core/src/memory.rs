//! In-memory collaborators.
//!
//! Thread-safe implementations of every trait in [`crate::store`], used by
//! the test suites and for running the services without a database. They
//! enforce the same uniqueness rules the PostgreSQL schema does.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use uuid::Uuid;

use crate::error::StoreError;
use crate::payment::model::{CartLine, NewOrder, Order, Product};
use crate::session::{NewSession, Session};
use crate::store::{
    CartProvider, CatalogProvider, OrderStore, SessionStore, StoreResult, UserStore,
};
use crate::types::{OrderId, ProductId, SessionId, Timestamp, UserId};
use crate::user::{NewUser, User};

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

#[derive(Default, Clone)]
pub struct MemoryUserStore {
    users: Arc<DashMap<UserId, User>>,
    by_email: Arc<DashMap<String, UserId>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn create(&self, input: NewUser) -> StoreResult<User> {
        let id = Uuid::new_v4();
        match self.by_email.entry(input.email.clone()) {
            Entry::Occupied(_) => Err(StoreError::UniqueViolation("uq_users_email".into())),
            Entry::Vacant(slot) => {
                let now = Utc::now();
                let user = User {
                    id,
                    email: input.email,
                    password_hash: input.password_hash,
                    full_name: input.full_name,
                    created_at: now,
                    updated_at: now,
                };
                self.users.insert(id, user.clone());
                slot.insert(id);
                Ok(user)
            }
        }
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        Ok(self
            .by_email
            .get(email)
            .and_then(|id| self.users.get(id.value()).map(|r| r.value().clone())))
    }

    async fn find_by_id(&self, id: UserId) -> StoreResult<Option<User>> {
        Ok(self.users.get(&id).map(|r| r.value().clone()))
    }
}

// ---------------------------------------------------------------------------
// Sessions
// ---------------------------------------------------------------------------

#[derive(Default, Clone)]
pub struct MemorySessionStore {
    sessions: Arc<DashMap<SessionId, Session>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Stored secret hash for a session, to check that raw secrets are not kept.
    pub fn secret_hash(&self, id: SessionId) -> Option<String> {
        self.sessions.get(&id).map(|s| s.secret_hash.clone())
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn create(&self, input: NewSession) -> StoreResult<Session> {
        let session = Session {
            id: input.id,
            user_id: input.user_id,
            secret_hash: input.secret_hash,
            expires_at: input.expires_at,
            created_at: Utc::now(),
        };
        match self.sessions.entry(input.id) {
            Entry::Occupied(_) => Err(StoreError::UniqueViolation("sessions_pkey".into())),
            Entry::Vacant(slot) => {
                slot.insert(session.clone());
                Ok(session)
            }
        }
    }

    async fn find_by_id(&self, id: SessionId) -> StoreResult<Option<Session>> {
        Ok(self.sessions.get(&id).map(|r| r.value().clone()))
    }

    async fn delete(&self, id: SessionId) -> StoreResult<bool> {
        Ok(self.sessions.remove(&id).is_some())
    }

    async fn delete_expired(&self, now: Timestamp) -> StoreResult<u64> {
        let before = self.sessions.len();
        self.sessions.retain(|_, session| !session.is_expired_at(now));
        Ok(before.saturating_sub(self.sessions.len()) as u64)
    }
}

// ---------------------------------------------------------------------------
// Orders
// ---------------------------------------------------------------------------

#[derive(Default, Clone)]
pub struct MemoryOrderStore {
    orders: Arc<DashMap<OrderId, Order>>,
    by_reference: Arc<DashMap<String, OrderId>>,
    unavailable: Arc<AtomicBool>,
    creates: Arc<AtomicUsize>,
}

impl MemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    /// Number of `create` calls that reached the store, successful or not.
    pub fn create_attempts(&self) -> usize {
        self.creates.load(Ordering::SeqCst)
    }

    /// Make every subsequent call fail with [`StoreError::Backend`].
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Insert a row as-is, e.g. a `pending` order left by an interrupted run.
    pub fn seed(&self, order: Order) {
        self.by_reference
            .insert(order.payment_reference.clone(), order.id);
        self.orders.insert(order.id, order);
    }

    fn check_available(&self) -> StoreResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("order store unavailable".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl OrderStore for MemoryOrderStore {
    async fn create(&self, input: NewOrder) -> StoreResult<Order> {
        self.check_available()?;
        self.creates.fetch_add(1, Ordering::SeqCst);
        match self.by_reference.entry(input.payment_reference.clone()) {
            Entry::Occupied(_) => Err(StoreError::UniqueViolation(
                "uq_orders_payment_reference".into(),
            )),
            Entry::Vacant(slot) => {
                let order = Order {
                    id: Uuid::new_v4(),
                    user_id: input.user_id,
                    payment_reference: input.payment_reference,
                    status: input.status,
                    total_minor: input.total_minor,
                    currency: input.currency,
                    created_at: Utc::now(),
                    lines: input.lines,
                };
                self.orders.insert(order.id, order.clone());
                slot.insert(order.id);
                Ok(order)
            }
        }
    }

    async fn find_by_id(&self, id: OrderId) -> StoreResult<Option<Order>> {
        self.check_available()?;
        Ok(self.orders.get(&id).map(|r| r.value().clone()))
    }

    async fn find_by_reference(&self, payment_reference: &str) -> StoreResult<Option<Order>> {
        self.check_available()?;
        Ok(self
            .by_reference
            .get(payment_reference)
            .and_then(|id| self.orders.get(id.value()).map(|r| r.value().clone())))
    }

    async fn list_for_user(&self, user_id: UserId) -> StoreResult<Vec<Order>> {
        self.check_available()?;
        let mut orders: Vec<Order> = self
            .orders
            .iter()
            .filter(|r| r.user_id == user_id)
            .map(|r| r.value().clone())
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }

    async fn update(&self, order: &Order) -> StoreResult<()> {
        self.check_available()?;
        match self.orders.get_mut(&order.id) {
            Some(mut row) => {
                *row = order.clone();
                Ok(())
            }
            None => Err(StoreError::Backend(format!("order {} does not exist", order.id))),
        }
    }
}

// ---------------------------------------------------------------------------
// Cart and catalog
// ---------------------------------------------------------------------------

#[derive(Default, Clone)]
pub struct MemoryCart {
    lines: Arc<Mutex<HashMap<UserId, Vec<CartLine>>>>,
    clears: Arc<DashMap<UserId, usize>>,
}

impl MemoryCart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, user_id: UserId, line: CartLine) {
        self.lines
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .entry(user_id)
            .or_default()
            .push(line);
    }

    /// How many times `clear` has emptied a non-empty cart for `user_id`.
    pub fn clears(&self, user_id: UserId) -> usize {
        self.clears.get(&user_id).map(|c| *c).unwrap_or(0)
    }
}

#[async_trait]
impl CartProvider for MemoryCart {
    async fn lines(&self, user_id: UserId) -> StoreResult<Vec<CartLine>> {
        Ok(self
            .lines
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(&user_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn clear(&self, user_id: UserId) -> StoreResult<()> {
        let removed = self
            .lines
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .remove(&user_id);
        if removed.is_some_and(|lines| !lines.is_empty()) {
            *self.clears.entry(user_id).or_insert(0) += 1;
        }
        Ok(())
    }
}

#[derive(Default, Clone)]
pub struct MemoryCatalog {
    products: Arc<DashMap<ProductId, Product>>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, product: Product) {
        self.products.insert(product.id, product);
    }
}

#[async_trait]
impl CatalogProvider for MemoryCatalog {
    async fn product(&self, id: ProductId) -> StoreResult<Option<Product>> {
        Ok(self.products.get(&id).map(|r| r.value().clone()))
    }
}
