//! Password hashing and verification with Argon2id.
//!
//! Hashes are PHC strings carrying the algorithm, parameters and a random
//! salt, so verification needs nothing beyond the stored string.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

/// Hash a password with a fresh random salt.
///
/// Two calls with the same password produce different strings.
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// Verify a password against a stored hash.
///
/// Never fails: a malformed hash, an empty password or any internal error
/// all return `false`, indistinguishable from a wrong password.
pub fn verify_password(password: &str, hash: &str) -> bool {
    if password.is_empty() {
        return false;
    }
    let Ok(parsed) = PasswordHash::new(hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}
