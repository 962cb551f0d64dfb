//! Authentication primitives and the session service.
//!
//! - [`password`] -- Argon2id hashing for passwords and refresh secrets.
//! - [`token`] -- HS256 access-token issuing and verification.
//! - [`credential`] -- The `<session id>:<secret>` refresh credential.
//! - [`service`] -- Register, login, refresh, logout, current user.

pub mod credential;
pub mod password;
pub mod service;
pub mod token;

pub use credential::RefreshCredential;
pub use password::CredentialHasher;
pub use service::{LoginOutcome, SessionConfig, SessionService};
pub use token::{Claims, TokenConfig, TokenIssuer};
