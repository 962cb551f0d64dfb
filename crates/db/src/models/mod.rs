//! Row types mapped with `sqlx::FromRow`.

pub mod cart;
pub mod order;
pub mod session;
pub mod user;
