//! Request handlers. Each delegates to a core service and maps errors via
//! [`crate::error::AppError`].

pub mod auth;
pub mod orders;
pub mod webhooks;
