use std::sync::Arc;

use auth::PasswordHasher;

use crate::domain::authentication::errors::AuthError;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::user::ports::UserRepository;

/// Salt length used when hashing refresh tokens.
pub const REFRESH_TOKEN_SALT_LENGTH: usize = 10;

/// Server-side record of the single valid refresh token per user.
///
/// Only a hash of the token is stored, on the user row. Writing a new hash
/// invalidates the previous token; clearing it ends the session.
pub struct SessionStore<UR>
where
    UR: UserRepository,
{
    users: Arc<UR>,
    hasher: PasswordHasher,
}

impl<UR> SessionStore<UR>
where
    UR: UserRepository,
{
    pub fn new(users: Arc<UR>) -> Self {
        Self {
            users,
            hasher: PasswordHasher::new(),
        }
    }

    /// Store the hash of `refresh_token` as the user's only valid session.
    pub async fn start_session(&self, id: &UserId, refresh_token: &str) -> Result<(), AuthError> {
        let refresh_token_hash = self
            .hasher
            .hash(refresh_token, REFRESH_TOKEN_SALT_LENGTH)?;

        self.users
            .set_refresh_token_hash(id, Some(refresh_token_hash))
            .await?;
        tracing::debug!(user_id = %id, "Session started");

        Ok(())
    }

    /// Check `presented` against the stored hash and return the user.
    ///
    /// # Errors
    /// * `SessionInvalid` - User missing, no stored hash, or hash mismatch
    pub async fn validate_session(&self, id: &UserId, presented: &str) -> Result<User, AuthError> {
        let user = self
            .users
            .find_by_id(id)
            .await?
            .ok_or(AuthError::SessionInvalid)?;

        match &user.refresh_token_hash {
            Some(stored) if self.hasher.compare(stored, presented) => Ok(user),
            _ => {
                tracing::warn!(user_id = %id, "Refresh token does not match the stored session");
                Err(AuthError::SessionInvalid)
            }
        }
    }

    /// Clear the stored hash. Idempotent.
    pub async fn end_session(&self, id: &UserId) -> Result<(), AuthError> {
        self.users.set_refresh_token_hash(id, None).await?;
        tracing::debug!(user_id = %id, "Session ended");

        Ok(())
    }
}
