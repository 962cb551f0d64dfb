//! Storefront domain core.
//!
//! Session and identity lifecycle ([`auth`]) and idempotent order
//! materialization from payment events ([`payment`]). Persistence and the
//! HTTP boundary live in `storefront-db` and `storefront-api`; this crate only
//! sees them through the traits in [`store`].

pub mod auth;
pub mod error;
pub mod memory;
pub mod payment;
pub mod session;
pub mod store;
pub mod types;
pub mod user;
