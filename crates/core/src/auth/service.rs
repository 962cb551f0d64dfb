//! Registration, login, refresh, logout and identity lookup.

use std::sync::Arc;

use chrono::{Duration, Utc};
use tokio::sync::OnceCell;

use crate::auth::credential::RefreshCredential;
use crate::auth::password::CredentialHasher;
use crate::auth::token::TokenIssuer;
use crate::error::{CoreError, CoreResult, StoreError};
use crate::session::NewSession;
use crate::store::{SessionStore, UserStore};
use crate::types::{Timestamp, UserId};
use crate::user::{NewUser, UserProfile};

/// Default session (refresh credential) lifetime in days.
pub const DEFAULT_REFRESH_TTL_DAYS: i64 = 7;

/// Hashed in place of a real password when the email is unknown, so both
/// login failure paths do the same work.
const TIMING_DUMMY_PASSWORD: &str = "timing-equalisation-placeholder";

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub refresh_ttl: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            refresh_ttl: Duration::days(DEFAULT_REFRESH_TTL_DAYS),
        }
    }
}

/// Result of a successful login.
///
/// `refresh_credential` carries the only copy of the raw secret that will
/// ever exist outside the client.
pub struct LoginOutcome {
    pub access_token: String,
    pub refresh_credential: RefreshCredential,
    pub refresh_expires_at: Timestamp,
}

/// Orchestrates identity and session lifecycle over the identity and
/// session stores.
pub struct SessionService {
    users: Arc<dyn UserStore>,
    sessions: Arc<dyn SessionStore>,
    hasher: CredentialHasher,
    tokens: TokenIssuer,
    config: SessionConfig,
    dummy_hash: OnceCell<String>,
}

impl SessionService {
    pub fn new(
        users: Arc<dyn UserStore>,
        sessions: Arc<dyn SessionStore>,
        hasher: CredentialHasher,
        tokens: TokenIssuer,
        config: SessionConfig,
    ) -> Self {
        Self {
            users,
            sessions,
            hasher,
            tokens,
            config,
            dummy_hash: OnceCell::new(),
        }
    }

    pub fn tokens(&self) -> &TokenIssuer {
        &self.tokens
    }

    pub fn refresh_ttl(&self) -> Duration {
        self.config.refresh_ttl
    }

    /// Create an identity. Fails with [`CoreError::DuplicateIdentity`] when
    /// the email is taken, leaving the existing row untouched.
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        full_name: &str,
    ) -> CoreResult<UserProfile> {
        if self.users.find_by_email(email).await?.is_some() {
            return Err(CoreError::DuplicateIdentity);
        }

        let password_hash = self.hash_secret(password).await?;
        let user = self
            .users
            .create(NewUser {
                email: email.to_string(),
                password_hash,
                full_name: full_name.to_string(),
            })
            .await
            .map_err(|e| match e {
                // Lost a race with a concurrent registration of the same email.
                StoreError::UniqueViolation(_) => CoreError::DuplicateIdentity,
                other => CoreError::StorageFailure(other),
            })?;

        tracing::info!(user_id = %user.id, "User registered");
        Ok(user.into())
    }

    /// Authenticate and open a new session.
    ///
    /// Unknown email and wrong password both yield
    /// [`CoreError::InvalidCredentials`].
    pub async fn login(&self, email: &str, password: &str) -> CoreResult<LoginOutcome> {
        let Some(user) = self.users.find_by_email(email).await? else {
            let dummy = self.dummy_hash().await?;
            let _ = self.verify_secret(password, dummy).await;
            return Err(CoreError::InvalidCredentials);
        };

        if !self.verify_secret(password, &user.password_hash).await? {
            tracing::debug!(user_id = %user.id, "Login rejected: password mismatch");
            return Err(CoreError::InvalidCredentials);
        }

        let access_token = self.tokens.issue(user.id, Some(&user.email))?;

        let credential = RefreshCredential::generate();
        let secret_hash = self.hash_secret(credential.secret()).await?;
        let expires_at = Utc::now() + self.config.refresh_ttl;

        self.sessions
            .create(NewSession {
                id: credential.session_id,
                user_id: user.id,
                secret_hash,
                expires_at,
            })
            .await?;

        tracing::info!(
            user_id = %user.id,
            session_id = %credential.session_id,
            "User logged in"
        );

        Ok(LoginOutcome {
            access_token,
            refresh_credential: credential,
            refresh_expires_at: expires_at,
        })
    }

    /// Exchange a refresh credential for a fresh access token.
    ///
    /// The session's secret is re-verified but not rotated, and its expiry is
    /// not extended.
    pub async fn refresh_access_token(&self, refresh_credential: &str) -> CoreResult<String> {
        let credential = RefreshCredential::parse(refresh_credential)?;

        let session = self
            .sessions
            .find_by_id(credential.session_id)
            .await?
            .ok_or(CoreError::InvalidSession)?;

        if session.is_expired_at(Utc::now()) {
            return Err(CoreError::SessionExpired);
        }

        if !self
            .verify_secret(credential.secret(), &session.secret_hash)
            .await?
        {
            tracing::warn!(session_id = %session.id, "Refresh rejected: secret mismatch");
            return Err(CoreError::InvalidSession);
        }

        let access_token = self.tokens.issue(session.user_id, None)?;
        tracing::debug!(user_id = %session.user_id, session_id = %session.id, "Access token refreshed");
        Ok(access_token)
    }

    /// End the session named by a refresh credential.
    ///
    /// Idempotent: an already-deleted session is not an error. Only a
    /// malformed credential fails.
    pub async fn logout(&self, refresh_credential: &str) -> CoreResult<()> {
        let credential = RefreshCredential::parse(refresh_credential)?;
        let deleted = self.sessions.delete(credential.session_id).await?;
        tracing::info!(session_id = %credential.session_id, deleted, "Session logged out");
        Ok(())
    }

    /// Validate an access token and return its user. Never touches storage.
    pub fn verify_access_token(&self, token: &str) -> CoreResult<UserId> {
        self.tokens.verify(token)
    }

    pub async fn current_user(&self, user_id: UserId) -> CoreResult<UserProfile> {
        self.users
            .find_by_id(user_id)
            .await?
            .map(UserProfile::from)
            .ok_or_else(|| CoreError::not_found("user", user_id))
    }

    /// Remove sessions whose expiry has passed. Garbage collection only.
    pub async fn sweep_expired_sessions(&self) -> CoreResult<u64> {
        Ok(self.sessions.delete_expired(Utc::now()).await?)
    }

    async fn dummy_hash(&self) -> CoreResult<&str> {
        self.dummy_hash
            .get_or_try_init(|| self.hash_secret(TIMING_DUMMY_PASSWORD))
            .await
            .map(String::as_str)
    }

    async fn hash_secret(&self, secret: &str) -> CoreResult<String> {
        let hasher = self.hasher.clone();
        let secret = secret.to_string();
        tokio::task::spawn_blocking(move || hasher.hash(&secret))
            .await
            .map_err(|e| CoreError::Internal(format!("hashing task failed: {e}")))?
            .map_err(|e| CoreError::Internal(format!("hashing failed: {e}")))
    }

    async fn verify_secret(&self, secret: &str, hash: &str) -> CoreResult<bool> {
        let hasher = self.hasher.clone();
        let secret = secret.to_string();
        let hash = hash.to_string();
        tokio::task::spawn_blocking(move || hasher.verify(&secret, &hash))
            .await
            .map_err(|e| CoreError::Internal(format!("verification task failed: {e}")))?
            .map_err(|e| CoreError::Internal(format!("stored hash is unreadable: {e}")))
    }
}
