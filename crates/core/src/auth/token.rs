//! Short-lived HS256 access tokens.
//!
//! Tokens are self-contained: verification checks the signature, the
//! algorithm and the timestamps, and never touches storage.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::CoreError;
use crate::types::UserId;

/// Default access token lifetime in minutes.
pub const DEFAULT_ACCESS_TTL_MINS: i64 = 15;

/// The only algorithm tokens are signed with or accepted under.
const SIGNING_ALGORITHM: Algorithm = Algorithm::HS256;

/// JWT claims embedded in every access token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject -- the user's id as a hyphenated UUID string.
    pub sub: String,
    /// Issued-at time (UTC Unix timestamp).
    pub iat: i64,
    /// Expiration time (UTC Unix timestamp).
    pub exp: i64,
    /// Email hint, present when the issuer knew it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Signing secret and lifetime for access tokens.
#[derive(Clone)]
pub struct TokenConfig {
    pub secret: String,
    pub access_ttl: Duration,
}

impl TokenConfig {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            access_ttl: Duration::minutes(DEFAULT_ACCESS_TTL_MINS),
        }
    }
}

impl std::fmt::Debug for TokenConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenConfig")
            .field("secret", &"<redacted>")
            .field("access_ttl", &self.access_ttl)
            .finish()
    }
}

/// Issues and verifies access tokens with one process-wide secret.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    access_ttl: Duration,
}

impl TokenIssuer {
    pub fn new(config: &TokenConfig) -> Self {
        let mut validation = Validation::new(SIGNING_ALGORITHM);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
            access_ttl: config.access_ttl,
        }
    }

    /// Access token lifetime, for `expires_in` style responses.
    pub fn access_ttl(&self) -> Duration {
        self.access_ttl
    }

    /// Sign a token for `user_id`, optionally carrying an email hint.
    pub fn issue(&self, user_id: UserId, email: Option<&str>) -> Result<String, CoreError> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: user_id.to_string(),
            iat: now,
            exp: now + self.access_ttl.num_seconds(),
            email: email.map(str::to_owned),
        };
        self.sign(&claims)
    }

    pub(crate) fn sign(&self, claims: &Claims) -> Result<String, CoreError> {
        encode(&Header::new(SIGNING_ALGORITHM), claims, &self.encoding_key)
            .map_err(|e| CoreError::Internal(format!("token signing failed: {e}")))
    }

    /// Decode and validate a token, returning its claims.
    ///
    /// Any signature, structure, algorithm or expiry failure is
    /// [`CoreError::InvalidToken`].
    pub fn decode(&self, token: &str) -> Result<Claims, CoreError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|_| CoreError::InvalidToken)
    }

    /// Validate a token and return the user it was issued to.
    pub fn verify(&self, token: &str) -> Result<UserId, CoreError> {
        let claims = self.decode(token)?;
        Uuid::parse_str(&claims.sub).map_err(|_| CoreError::InvalidToken)
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn issuer(secret: &str) -> TokenIssuer {
        TokenIssuer::new(&TokenConfig::new(secret))
    }

    #[test]
    fn test_issue_and_verify() {
        let issuer = issuer("test-secret-that-is-long-enough-for-hmac");
        let user_id = Uuid::new_v4();

        let token = issuer.issue(user_id, Some("a@example.com")).unwrap();
        assert_eq!(issuer.verify(&token).unwrap(), user_id);

        let claims = issuer.decode(&token).unwrap();
        assert_eq!(claims.email.as_deref(), Some("a@example.com"));
        assert_eq!(claims.exp - claims.iat, 15 * 60);
    }

    #[test]
    fn test_expired_token_fails() {
        let issuer = issuer("test-secret");
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: Uuid::new_v4().to_string(),
            iat: now - 600,
            exp: now - 300,
            email: None,
        };
        let token = issuer.sign(&claims).unwrap();

        assert_matches!(issuer.verify(&token), Err(CoreError::InvalidToken));
    }

    #[test]
    fn test_different_secrets_fail() {
        let token = issuer("secret-alpha").issue(Uuid::new_v4(), None).unwrap();
        assert_matches!(issuer("secret-bravo").verify(&token), Err(CoreError::InvalidToken));
    }

    #[test]
    fn test_other_algorithm_is_rejected() {
        let secret = "shared-secret";
        let claims = Claims {
            sub: Uuid::new_v4().to_string(),
            iat: Utc::now().timestamp(),
            exp: Utc::now().timestamp() + 60,
            email: None,
        };
        let token = encode(
            &Header::new(Algorithm::HS512),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap();

        assert_matches!(issuer(secret).verify(&token), Err(CoreError::InvalidToken));
    }

    #[test]
    fn test_non_uuid_subject_is_rejected() {
        let issuer = issuer("test-secret");
        let claims = Claims {
            sub: "42".to_string(),
            iat: Utc::now().timestamp(),
            exp: Utc::now().timestamp() + 60,
            email: None,
        };
        let token = issuer.sign(&claims).unwrap();
        assert_matches!(issuer.verify(&token), Err(CoreError::InvalidToken));
    }

    #[test]
    fn test_garbage_is_rejected() {
        assert_matches!(issuer("s").verify("not.a.jwt"), Err(CoreError::InvalidToken));
        assert_matches!(issuer("s").verify(""), Err(CoreError::InvalidToken));
    }
}
