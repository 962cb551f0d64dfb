//! Handlers for the caller's own orders.

use axum::extract::{Path, State};
use axum::Json;
use storefront_core::payment::Order;
use storefront_core::types::OrderId;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/orders
pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<DataResponse<Vec<Order>>>> {
    let orders = state.orders.list_for_user(auth.user_id).await?;
    Ok(Json(DataResponse { data: orders }))
}

/// GET /api/v1/orders/{id}
///
/// Another user's order is reported exactly like a missing one.
pub async fn get_by_id(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(order_id): Path<OrderId>,
) -> AppResult<Json<DataResponse<Order>>> {
    let order = state.orders.get_for_user(order_id, auth.user_id).await?;
    Ok(Json(DataResponse { data: order }))
}
