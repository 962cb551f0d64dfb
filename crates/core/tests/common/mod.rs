//! Shared fixtures for the core integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use argon2::Params;
use chrono::Duration;

use storefront_core::auth::{CredentialHasher, SessionConfig, SessionService, TokenConfig, TokenIssuer};
use storefront_core::memory::{
    MemoryCart, MemoryCatalog, MemoryOrderStore, MemorySessionStore, MemoryUserStore,
};
use storefront_core::payment::{CartLine, PaymentEventProcessor, Product};
use storefront_core::types::{ProductId, UserId};

pub const TEST_SECRET: &str = "integration-test-signing-secret";
pub const TEST_PASSWORD: &str = "correct-horse-battery";

/// Argon2 parameters cheap enough for tests.
pub fn cheap_hasher() -> CredentialHasher {
    CredentialHasher::new(Params::new(8, 1, 1, None).expect("valid argon2 params"))
}

pub struct SessionHarness {
    pub users: MemoryUserStore,
    pub sessions: MemorySessionStore,
    pub service: SessionService,
}

/// A session service over fresh in-memory stores with the given session lifetime.
pub fn session_harness(refresh_ttl: Duration) -> SessionHarness {
    let users = MemoryUserStore::new();
    let sessions = MemorySessionStore::new();
    let service = SessionService::new(
        Arc::new(users.clone()),
        Arc::new(sessions.clone()),
        cheap_hasher(),
        TokenIssuer::new(&TokenConfig::new(TEST_SECRET)),
        SessionConfig { refresh_ttl },
    );
    SessionHarness {
        users,
        sessions,
        service,
    }
}

pub fn default_session_harness() -> SessionHarness {
    session_harness(SessionConfig::default().refresh_ttl)
}

pub struct PaymentHarness {
    pub orders: MemoryOrderStore,
    pub cart: MemoryCart,
    pub catalog: MemoryCatalog,
    pub processor: Arc<PaymentEventProcessor>,
}

pub fn payment_harness() -> PaymentHarness {
    let orders = MemoryOrderStore::new();
    let cart = MemoryCart::new();
    let catalog = MemoryCatalog::new();
    let processor = PaymentEventProcessor::new(
        Arc::new(orders.clone()),
        Arc::new(cart.clone()),
        Arc::new(catalog.clone()),
    );
    PaymentHarness {
        orders,
        cart,
        catalog,
        processor: Arc::new(processor),
    }
}

pub fn product(id: ProductId, title: &str, price: f64) -> Product {
    Product {
        id,
        title: title.to_string(),
        price,
        image_url: format!("https://img.example/{id}.jpg"),
    }
}

impl PaymentHarness {
    /// Put a product in the catalog and `quantity` of it in the user's cart.
    pub fn stock_and_add(&self, user_id: UserId, product: Product, quantity: i32) {
        self.cart.add(
            user_id,
            CartLine {
                product_id: product.id,
                quantity,
                unit_price: product.price,
                title: product.title.clone(),
                image_url: product.image_url.clone(),
            },
        );
        self.catalog.insert(product);
    }

    /// The two-line cart from the pricing example: 2 x 19.99 and 1 x 5.00.
    pub fn two_line_cart(&self, user_id: UserId) {
        self.stock_and_add(user_id, product(1, "Backpack", 19.99), 2);
        self.stock_and_add(user_id, product(2, "T-Shirt", 5.00), 1);
    }
}
