//! The opaque refresh credential handed to clients.
//!
//! Wire form is `<session id><SEPARATOR><raw secret>`. The session id is the
//! public lookup key; the secret is shown to the client once and only its
//! hash is stored.

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use uuid::Uuid;

use crate::error::CoreError;
use crate::types::SessionId;

/// Separates the session id from the raw secret.
pub const SEPARATOR: char = ':';

/// Random bytes in a freshly generated secret (hex encoded on the wire).
pub const SECRET_BYTES: usize = 32;

#[derive(Clone, PartialEq, Eq)]
pub struct RefreshCredential {
    pub session_id: SessionId,
    secret: String,
}

impl RefreshCredential {
    /// A new session id paired with a high-entropy random secret.
    pub fn generate() -> Self {
        let mut bytes = [0u8; SECRET_BYTES];
        rand::rng().fill(&mut bytes[..]);
        Self {
            session_id: Uuid::new_v4(),
            secret: hex::encode(bytes),
        }
    }

    /// Split a wire value into its halves.
    ///
    /// Fails with [`CoreError::MalformedCredential`] when the separator is
    /// missing, either half is empty, or the id half is not a UUID.
    pub fn parse(value: &str) -> Result<Self, CoreError> {
        let (id, secret) = value
            .split_once(SEPARATOR)
            .ok_or(CoreError::MalformedCredential)?;
        if id.is_empty() || secret.is_empty() {
            return Err(CoreError::MalformedCredential);
        }
        let session_id = Uuid::parse_str(id).map_err(|_| CoreError::MalformedCredential)?;
        Ok(Self {
            session_id,
            secret: secret.to_string(),
        })
    }

    pub fn secret(&self) -> &str {
        &self.secret
    }
}

impl fmt::Display for RefreshCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.session_id, SEPARATOR, self.secret)
    }
}

impl fmt::Debug for RefreshCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RefreshCredential")
            .field("session_id", &self.session_id)
            .field("secret", &"<redacted>")
            .finish()
    }
}

impl FromStr for RefreshCredential {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn test_generated_credential_survives_the_wire() {
        let credential = RefreshCredential::generate();
        let wire = credential.to_string();

        assert_eq!(credential.secret().len(), SECRET_BYTES * 2);
        assert_eq!(RefreshCredential::parse(&wire).unwrap(), credential);
    }

    #[test]
    fn test_secrets_are_not_repeated() {
        let a = RefreshCredential::generate();
        let b = RefreshCredential::generate();
        assert_ne!(a.secret(), b.secret());
        assert_ne!(a.session_id, b.session_id);
    }

    #[test]
    fn test_secret_may_contain_the_separator() {
        let id = Uuid::new_v4();
        let parsed = RefreshCredential::parse(&format!("{id}:ab:cd")).unwrap();
        assert_eq!(parsed.session_id, id);
        assert_eq!(parsed.secret(), "ab:cd");
    }

    #[test]
    fn test_malformed_values_are_rejected() {
        let id = Uuid::new_v4();
        for value in [
            String::new(),
            "no-separator".to_string(),
            format!("{id}"),
            format!("{id}:"),
            ":secret".to_string(),
            "not-a-uuid:secret".to_string(),
        ] {
            assert_matches!(
                RefreshCredential::parse(&value),
                Err(CoreError::MalformedCredential),
                "value {value:?} should be malformed"
            );
        }
    }

    #[test]
    fn test_debug_output_hides_the_secret() {
        let credential = RefreshCredential::generate();
        let debug = format!("{credential:?}");
        assert!(!debug.contains(credential.secret()));
    }
}
