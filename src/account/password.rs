//! Argon2id password hashing.
//!
//! Digests are PHC strings. Federated-only accounts carry the locked
//! sentinel instead of a real digest; it fails PHC parsing, so [`verify`]
//! returns `false` for any plaintext without raising an error.

use anyhow::{Result, anyhow};
use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

/// Stored in place of a digest for accounts that must never authenticate
/// with a password. Same convention as a locked shadow entry.
pub const SENTINEL: &str = "!";

/// Hash a plaintext password with a per-call random salt.
pub fn hash(plaintext: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(plaintext.as_bytes(), &salt)
        .map(|digest| digest.to_string())
        .map_err(|err| anyhow!("failed to hash password: {err}"))
}

/// Constant-time verification of `plaintext` against a stored digest.
///
/// Unparsable digests (including the sentinel) verify as `false`.
#[must_use]
pub fn verify(plaintext: &str, digest: &str) -> bool {
    match PasswordHash::new(digest) {
        Ok(parsed) => Argon2::default()
            .verify_password(plaintext.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

/// The digest stored for federated-only accounts.
#[must_use]
pub fn sentinel() -> String {
    SENTINEL.to_string()
}
