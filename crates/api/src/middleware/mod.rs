//! Request extractors.
//!
//! - [`auth::AuthUser`] -- The user behind a Bearer access token.
//! - [`auth::RefreshCookie`] -- The refresh credential cookie, when present.

pub mod auth;
