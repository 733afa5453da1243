//! Client password hashing with Argon2id.
//!
//! Client passwords are never stored in clear text. The PHC string produced
//! here is what lands in the `clients.password_hash` column.

use argon2::{
    Argon2, PasswordHash,
    password_hash::{PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use thiserror::Error;

/// Errors that can occur during password operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PasswordError {
    /// Failed to hash password.
    #[error("failed to hash password: {0}")]
    Hash(String),

    /// Failed to verify password.
    #[error("failed to verify password: {0}")]
    Verify(String),

    /// Stored hash is not a valid PHC string.
    #[error("invalid password hash format")]
    InvalidHash,
}

/// Hashes a client password.
///
/// ```
/// use bankdesk_core::customer::password::hash_password;
///
/// let hash = hash_password("1234").unwrap();
/// assert!(hash.starts_with("$argon2id$"));
/// ```
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| PasswordError::Hash(e.to_string()))
}

/// Checks a client password against its stored hash.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError> {
    let parsed = PasswordHash::new(hash).map_err(|_| PasswordError::InvalidHash)?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(PasswordError::Verify(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_then_verify() {
        let hash = hash_password("5678").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("5678", &hash).unwrap());
        assert!(!verify_password("1245", &hash).unwrap());
    }

    #[test]
    fn test_same_password_salted_differently() {
        assert_ne!(hash_password("1234").unwrap(), hash_password("1234").unwrap());
    }

    #[test]
    fn test_clear_text_is_not_a_hash() {
        assert_eq!(verify_password("1234", "1234"), Err(PasswordError::InvalidHash));
    }
}
