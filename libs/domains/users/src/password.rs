//! Credential primitive: salted, slow hashing with constant-time verification.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use crate::error::{UserError, UserResult};

/// Opaque hasher/verifier around Argon2.
///
/// `encode` is intentionally slow; callers should treat both operations as
/// suspension-point-grade work and never hold locks across them.
#[derive(Clone, Copy, Debug, Default)]
pub struct PasswordEncoder;

impl PasswordEncoder {
    pub fn encode(&self, plaintext: &str) -> UserResult<String> {
        let salt = SaltString::generate(&mut OsRng);

        Argon2::default()
            .hash_password(plaintext.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| UserError::PasswordHash(e.to_string()))
    }

    /// Constant-time comparison of a plaintext against a stored hash.
    pub fn matches(&self, plaintext: &str, hash: &str) -> UserResult<bool> {
        let parsed_hash =
            PasswordHash::new(hash).map_err(|e| UserError::PasswordHash(e.to_string()))?;

        Ok(Argon2::default()
            .verify_password(plaintext.as_bytes(), &parsed_hash)
            .is_ok())
    }
}
