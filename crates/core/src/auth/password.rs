//! Argon2id hashing and verification for passwords and refresh secrets.
//!
//! Hashes are stored in PHC string format, so the algorithm parameters and
//! the salt travel with the hash and verification needs no configuration.
//! Comparison is done by the `argon2` crate, never by hand.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};

/// Slow, salted one-way hasher.
///
/// The cost comes from `params`; [`Params::DEFAULT`] lands near 100ms per
/// verification on commodity hardware in release builds.
#[derive(Debug, Clone)]
pub struct CredentialHasher {
    params: Params,
}

impl Default for CredentialHasher {
    fn default() -> Self {
        Self::new(Params::DEFAULT)
    }
}

impl CredentialHasher {
    pub fn new(params: Params) -> Self {
        Self { params }
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    /// Hash a plaintext secret with a fresh random salt.
    ///
    /// Returns the PHC-formatted hash string.
    pub fn hash(&self, secret: &str) -> Result<String, argon2::password_hash::Error> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self.argon2().hash_password(secret.as_bytes(), &salt)?;
        Ok(hash.to_string())
    }

    /// Verify a plaintext secret against a stored PHC hash.
    ///
    /// Returns `Ok(false)` on mismatch; `Err` only for an unparseable hash.
    pub fn verify(&self, secret: &str, hash: &str) -> Result<bool, argon2::password_hash::Error> {
        let parsed_hash = PasswordHash::new(hash)?;
        match self.argon2().verify_password(secret.as_bytes(), &parsed_hash) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(e),
        }
    }
}
