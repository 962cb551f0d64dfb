use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use storefront_core::error::CoreError;

use crate::webhook::WebhookError;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `storefront_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A webhook that failed verification or could not be parsed.
    #[error(transparent)]
    Webhook(#[from] WebhookError),

    /// Request body failed field validation.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Missing or unusable credentials on the request itself.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

const INTERNAL_MESSAGE: &str = "An internal error occurred";

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => classify_core_error(core),

            // --- Webhook errors ---
            AppError::Webhook(err) => {
                tracing::warn!(error = %err, "Rejected webhook");
                let code = match err {
                    WebhookError::MissingSignature => "MISSING_SIGNATURE",
                    WebhookError::MalformedHeader(_)
                    | WebhookError::InvalidSignature
                    | WebhookError::TimestampOutOfRange => "INVALID_SIGNATURE",
                    WebhookError::MalformedPayload(_) => "INVALID_PAYLOAD",
                };
                (StatusCode::BAD_REQUEST, code, err.to_string())
            }

            // --- HTTP-specific errors ---
            AppError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
            }
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone()),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    INTERNAL_MESSAGE.to_string(),
                )
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

/// Map a domain error onto an HTTP status, error code, and message.
///
/// Storage and internal failures are logged here and reach the client only
/// as a generic 500.
fn classify_core_error(err: &CoreError) -> (StatusCode, &'static str, String) {
    let message = err.to_string();
    match err {
        CoreError::DuplicateIdentity => (StatusCode::CONFLICT, "DUPLICATE_IDENTITY", message),
        CoreError::InvalidCredentials => {
            (StatusCode::UNAUTHORIZED, "INVALID_CREDENTIALS", message)
        }
        CoreError::MalformedCredential => {
            (StatusCode::UNAUTHORIZED, "MALFORMED_CREDENTIAL", message)
        }
        CoreError::InvalidSession => (StatusCode::UNAUTHORIZED, "INVALID_SESSION", message),
        CoreError::SessionExpired => (StatusCode::UNAUTHORIZED, "SESSION_EXPIRED", message),
        CoreError::InvalidToken => (StatusCode::UNAUTHORIZED, "INVALID_TOKEN", message),
        CoreError::NotFound { entity, .. } => {
            (StatusCode::NOT_FOUND, "NOT_FOUND", format!("{entity} not found"))
        }
        CoreError::MissingReference => (StatusCode::BAD_REQUEST, "MISSING_REFERENCE", message),
        CoreError::MissingUser => (StatusCode::BAD_REQUEST, "MISSING_USER", message),
        CoreError::StorageFailure(store) => {
            tracing::error!(error = %store, "Storage failure");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                INTERNAL_MESSAGE.to_string(),
            )
        }
        CoreError::Internal(msg) => {
            tracing::error!(error = %msg, "Internal core error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                INTERNAL_MESSAGE.to_string(),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storefront_core::error::StoreError;

    fn status_of(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_domain_errors_map_to_expected_statuses() {
        assert_eq!(status_of(CoreError::DuplicateIdentity.into()), StatusCode::CONFLICT);
        assert_eq!(status_of(CoreError::InvalidCredentials.into()), StatusCode::UNAUTHORIZED);
        assert_eq!(status_of(CoreError::SessionExpired.into()), StatusCode::UNAUTHORIZED);
        assert_eq!(status_of(CoreError::not_found("order", 7).into()), StatusCode::NOT_FOUND);
        assert_eq!(status_of(CoreError::MissingUser.into()), StatusCode::BAD_REQUEST);
        assert_eq!(
            status_of(CoreError::StorageFailure(StoreError::Backend("db down".into())).into()),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_webhook_errors_are_bad_requests() {
        assert_eq!(status_of(WebhookError::InvalidSignature.into()), StatusCode::BAD_REQUEST);
        assert_eq!(status_of(WebhookError::MissingSignature.into()), StatusCode::BAD_REQUEST);
    }
}
