use std::sync::Arc;

use storefront_core::auth::{SessionService, TokenIssuer};
use storefront_core::payment::{OrderService, PaymentEventProcessor};
use storefront_core::store::{CartProvider, CatalogProvider, OrderStore, SessionStore, UserStore};

use crate::config::ServerConfig;
use crate::webhook::WebhookVerifier;

/// The collaborators the services run on. Production wires PostgreSQL
/// repositories and the HTTP catalog; tests wire the in-memory stores.
#[derive(Clone)]
pub struct Stores {
    pub users: Arc<dyn UserStore>,
    pub sessions: Arc<dyn SessionStore>,
    pub orders: Arc<dyn OrderStore>,
    pub cart: Arc<dyn CartProvider>,
    pub catalog: Arc<dyn CatalogProvider>,
}

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database pool, when running against PostgreSQL (used by `/health`).
    pub pool: Option<storefront_db::DbPool>,
    pub config: Arc<ServerConfig>,
    pub sessions: Arc<SessionService>,
    pub payments: Arc<PaymentEventProcessor>,
    pub orders: Arc<OrderService>,
    pub webhook: Arc<WebhookVerifier>,
}

impl AppState {
    pub fn new(config: ServerConfig, stores: Stores, pool: Option<storefront_db::DbPool>) -> Self {
        let sessions = SessionService::new(
            stores.users,
            stores.sessions,
            config.hasher(),
            TokenIssuer::new(&config.jwt),
            config.session.clone(),
        );
        let payments = PaymentEventProcessor::new(
            Arc::clone(&stores.orders),
            stores.cart,
            stores.catalog,
        )
        .with_currency(config.order_currency.clone());
        let orders = OrderService::new(stores.orders);
        let webhook = WebhookVerifier::new(config.webhook_secret.clone(), config.webhook_tolerance_secs);

        Self {
            pool,
            config: Arc::new(config),
            sessions: Arc::new(sessions),
            payments: Arc::new(payments),
            orders: Arc::new(orders),
            webhook: Arc::new(webhook),
        }
    }
}
