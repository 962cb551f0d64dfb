//! Turning payment confirmations into orders, exactly once per reference.
//!
//! - [`model`] -- Order, line snapshot, cart and catalog shapes.
//! - [`pricing`] -- Decimal to minor-unit conversion.
//! - [`event`] -- Verified payment events handed in by the webhook boundary.
//! - [`processor`] -- Success/failure materialization state machine.
//! - [`orders`] -- Owner-scoped order reads.

pub mod event;
pub mod locks;
pub mod model;
pub mod orders;
pub mod pricing;
pub mod processor;

pub use event::PaymentEvent;
pub use model::{CartLine, NewOrder, Order, OrderLine, OrderStatus, Product};
pub use orders::OrderService;
pub use processor::{EventOutcome, FailureOutcome, Materialization, PaymentEventProcessor};
