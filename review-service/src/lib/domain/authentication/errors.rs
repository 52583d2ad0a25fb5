use auth::JwtError;
use auth::PasswordError;
use thiserror::Error;

use crate::user::errors::PasswordPolicyError;
use crate::user::errors::UserError;

/// Error for credential, session and authorization operations
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("Wrong credentials provided")]
    InvalidCredentials,

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token")]
    TokenInvalid,

    #[error("Session is no longer valid")]
    SessionInvalid,

    #[error("Invalid or expired reset link")]
    ResetTokenInvalid,

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Forbidden resource")]
    Forbidden,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    // Infrastructure errors
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

/// Error for outbound mail delivery
#[derive(Debug, Clone, Error)]
pub enum MailerError {
    #[error("Invalid mail address: {0}")]
    InvalidAddress(String),

    #[error("Failed to build mail message: {0}")]
    BuildFailed(String),

    #[error("Failed to send mail: {0}")]
    SendFailed(String),
}

impl From<UserError> for AuthError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::NotFound(id) => AuthError::NotFound(id),
            UserError::UsernameAlreadyExists(_) | UserError::EmailAlreadyExists(_) => {
                AuthError::Conflict(err.to_string())
            }
            UserError::InvalidUserId(_)
            | UserError::InvalidUsername(_)
            | UserError::InvalidEmail(_)
            | UserError::InvalidAccess(_) => AuthError::Validation(err.to_string()),
            UserError::DatabaseError(msg) => AuthError::DatabaseError(msg),
            UserError::Unknown(msg) => AuthError::Unknown(msg),
        }
    }
}

impl From<JwtError> for AuthError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::TokenExpired => AuthError::TokenExpired,
            JwtError::InvalidToken(_) => AuthError::TokenInvalid,
            JwtError::EncodingFailed(_) | JwtError::InvalidConfiguration(_) => {
                AuthError::Unknown(err.to_string())
            }
        }
    }
}

impl From<PasswordError> for AuthError {
    fn from(err: PasswordError) -> Self {
        AuthError::Unknown(err.to_string())
    }
}

impl From<PasswordPolicyError> for AuthError {
    fn from(err: PasswordPolicyError) -> Self {
        AuthError::Validation(err.to_string())
    }
}
