pub mod auth;
pub mod health;
pub mod orders;
pub mod webhooks;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/register                register (public)
/// /auth/login                   login (public, sets refresh cookie)
/// /auth/refresh                 new access token from refresh cookie
/// /auth/logout                  end session, clear refresh cookie
/// /auth/me                      current user (requires auth)
///
/// /orders                       caller's orders (requires auth)
/// /orders/{id}                  one of the caller's orders (requires auth)
///
/// /webhooks/stripe              payment provider events (signature checked)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/orders", orders::router())
        .nest("/webhooks", webhooks::router())
}
