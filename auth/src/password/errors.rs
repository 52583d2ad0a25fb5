use thiserror::Error;

/// Error type for password operations.
///
/// Only raised for misuse (bad salt length) or KDF failure. A wrong
/// password is never an error, `compare` simply returns `false`.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PasswordError {
    #[error("Salt too short: minimum {min} bytes, got {actual}")]
    SaltTooShort { min: usize, actual: usize },

    #[error("Password hashing failed: {0}")]
    HashingFailed(String),
}
