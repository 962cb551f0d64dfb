//! Access-token and refresh-cookie extractors, plus the refresh cookie format.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::header::AUTHORIZATION;
use axum_extra::extract::cookie::CookieJar;
use storefront_core::types::UserId;

use crate::error::AppError;
use crate::state::AppState;

/// Name of the cookie that carries the refresh credential.
pub const REFRESH_COOKIE_NAME: &str = "refresh_token";

/// Authenticated user extracted from a Bearer token in the `Authorization` header.
///
/// Verification is a pure function of the token; no storage is consulted.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: UserId,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::Unauthorized("Missing Authorization header".into()))?;

        let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
            AppError::Unauthorized("Invalid Authorization format. Expected: Bearer <token>".into())
        })?;

        let user_id = state.sessions.verify_access_token(token)?;

        Ok(AuthUser { user_id })
    }
}

/// The refresh credential cookie value, if the request carried a non-empty one.
#[derive(Debug, Clone)]
pub struct RefreshCookie(pub Option<String>);

impl<S: Send + Sync> FromRequestParts<S> for RefreshCookie {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_request_parts(parts, state).await?;
        Ok(RefreshCookie(
            jar.get(REFRESH_COOKIE_NAME)
                .map(|c| c.value().to_string())
                .filter(|v| !v.is_empty()),
        ))
    }
}

/// `Set-Cookie` value storing the refresh credential.
pub fn refresh_cookie(value: &str, max_age_secs: i64, secure: bool) -> String {
    let secure = if secure { "; Secure" } else { "" };
    format!(
        "{REFRESH_COOKIE_NAME}={value}; Path=/; Max-Age={max_age_secs}; HttpOnly{secure}; SameSite=Strict"
    )
}

/// `Set-Cookie` value that removes the refresh cookie, with matching attributes.
pub fn clear_refresh_cookie(secure: bool) -> String {
    refresh_cookie("", 0, secure)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_refresh_cookie_has_hardened_attributes() {
        let cookie = refresh_cookie("abc:def", 604_800, true);
        assert!(cookie.starts_with("refresh_token=abc:def;"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("; Secure"));
        assert!(cookie.contains("SameSite=Strict"));
        assert!(cookie.contains("Path=/"));
        assert!(cookie.contains("Max-Age=604800"));
    }

    #[test]
    fn test_insecure_cookie_for_local_development() {
        assert!(!refresh_cookie("v", 1, false).contains("Secure"));
    }

    #[test]
    fn test_clearing_cookie_expires_it() {
        let cookie = clear_refresh_cookie(true);
        assert!(cookie.starts_with("refresh_token=;"));
        assert!(cookie.contains("Max-Age=0"));
    }
}
