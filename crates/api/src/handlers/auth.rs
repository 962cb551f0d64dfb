//! Handlers for the `/auth` resource.

use axum::extract::State;
use axum::http::header::SET_COOKIE;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use storefront_core::user::UserProfile;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::{clear_refresh_cookie, refresh_cookie, AuthUser, RefreshCookie};
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/register`.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    #[validate(length(min = 8, message = "must be at least 8 characters long"))]
    pub password: String,
    #[validate(length(min = 1, message = "must not be empty"))]
    pub full_name: String,
}

/// Request body for `POST /auth/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Access token returned by login and refresh. The refresh credential
/// travels only in the cookie.
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: &'static str,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
}

impl TokenResponse {
    fn bearer(access_token: String, state: &AppState) -> Self {
        Self {
            access_token,
            token_type: "Bearer",
            expires_in: state.sessions.tokens().access_ttl().num_seconds(),
        }
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/auth/register
pub async fn register(
    State(state): State<AppState>,
    Json(input): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<UserProfile>>)> {
    input
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let profile = state
        .sessions
        .register(input.email.trim(), &input.password, input.full_name.trim())
        .await?;

    Ok((StatusCode::CREATED, Json(DataResponse { data: profile })))
}

/// POST /api/v1/auth/login
///
/// Returns the access token in the body and sets the refresh cookie.
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginRequest>,
) -> AppResult<impl IntoResponse> {
    let outcome = state
        .sessions
        .login(input.email.trim(), &input.password)
        .await?;

    let cookie = refresh_cookie(
        &outcome.refresh_credential.to_string(),
        state.sessions.refresh_ttl().num_seconds(),
        state.config.cookie_secure,
    );

    Ok((
        [(SET_COOKIE, cookie)],
        Json(DataResponse {
            data: TokenResponse::bearer(outcome.access_token, &state),
        }),
    ))
}

/// POST /api/v1/auth/refresh
///
/// Exchange the refresh cookie for a new access token. The cookie itself is
/// left as is.
pub async fn refresh(
    State(state): State<AppState>,
    RefreshCookie(credential): RefreshCookie,
) -> AppResult<Json<DataResponse<TokenResponse>>> {
    let credential =
        credential.ok_or_else(|| AppError::Unauthorized("Missing refresh token".into()))?;

    let access_token = state.sessions.refresh_access_token(&credential).await?;

    Ok(Json(DataResponse {
        data: TokenResponse::bearer(access_token, &state),
    }))
}

/// POST /api/v1/auth/logout
///
/// Always answers 204 and clears the cookie; a failure to delete the session
/// is logged, not surfaced.
pub async fn logout(
    State(state): State<AppState>,
    RefreshCookie(credential): RefreshCookie,
) -> impl IntoResponse {
    if let Some(credential) = credential {
        if let Err(e) = state.sessions.logout(&credential).await {
            tracing::warn!(error = %e, "Logout could not end the session");
        }
    }

    (
        StatusCode::NO_CONTENT,
        [(SET_COOKIE, clear_refresh_cookie(state.config.cookie_secure))],
    )
}

/// GET /api/v1/auth/me
pub async fn me(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<DataResponse<UserProfile>>> {
    let profile = state.sessions.current_user(auth.user_id).await?;
    Ok(Json(DataResponse { data: profile }))
}
