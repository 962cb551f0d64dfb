//! Storefront API server library.
//!
//! Exposes the building blocks (config, state, error handling, routes,
//! webhook verification, upstream adapters) so integration tests and the
//! binary entrypoint can both access them.

pub mod background;
pub mod cart;
pub mod catalog;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod router;
pub mod routes;
pub mod state;
pub mod webhook;
