//! Payment provider webhook.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use chrono::Utc;
use serde::Serialize;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;
use crate::webhook::{parse_event, WebhookError};

pub const SIGNATURE_HEADER: &str = "stripe-signature";

#[derive(Debug, Serialize)]
pub struct WebhookAck {
    pub received: bool,
}

/// POST /api/v1/webhooks/stripe
///
/// Unsigned or forged deliveries are rejected before any order logic runs.
/// Storage failures surface as 500 so the provider retries the delivery.
pub async fn stripe(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<Json<DataResponse<WebhookAck>>> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .ok_or(WebhookError::MissingSignature)?;

    state
        .webhook
        .verify(&body, signature, Utc::now().timestamp())?;

    match parse_event(&body)? {
        Some(event) => {
            let outcome = state.payments.handle(&event).await?;
            tracing::info!(
                payment_reference = event.payment_reference(),
                outcome = ?outcome,
                "Payment event processed"
            );
        }
        None => {
            tracing::debug!("Ignoring unhandled webhook event type");
        }
    }

    Ok(Json(DataResponse {
        data: WebhookAck { received: true },
    }))
}
