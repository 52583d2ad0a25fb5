use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;

use crate::domain::authentication::errors::AuthError;
use crate::domain::authentication::errors::MailerError;
use crate::domain::authentication::models::ChangePasswordCommand;
use crate::domain::authentication::models::RegisterCommand;
use crate::domain::authentication::models::ResetToken;
use crate::domain::authentication::models::SessionTokens;
use crate::domain::authorization::Actor;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::Password;
use crate::domain::user::models::PublicUser;
use crate::domain::user::models::UserId;

/// Port for credential and session operations.
#[async_trait]
pub trait AuthenticationServicePort: Send + Sync + 'static {
    /// Create an account with the default role and permissions.
    ///
    /// # Errors
    /// * `Conflict` - Username or email already registered
    /// * `DatabaseError` - Database operation failed
    async fn register(&self, command: RegisterCommand) -> Result<PublicUser, AuthError>;

    /// Check credentials and start a new session.
    ///
    /// # Errors
    /// * `InvalidCredentials` - Unknown email or wrong password
    async fn log_in(&self, email: &str, password: &str) -> Result<SessionTokens, AuthError>;

    /// Exchange a refresh token for a new token pair, rotating the session.
    ///
    /// # Errors
    /// * `TokenExpired` / `TokenInvalid` - Refresh token failed verification
    /// * `SessionInvalid` - Token is not the one currently stored for the user
    async fn refresh(&self, refresh_token: &str) -> Result<SessionTokens, AuthError>;

    /// End the user's session. Idempotent.
    async fn log_out(&self, id: &UserId) -> Result<(), AuthError>;

    /// Replace the password after checking the current one.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `InvalidCredentials` - Old password does not match
    async fn change_password(
        &self,
        id: &UserId,
        command: ChangePasswordCommand,
    ) -> Result<PublicUser, AuthError>;

    /// Send a reset link when the email is registered.
    ///
    /// Completes the same way whether or not the email is known.
    async fn forgot_password(&self, email: &EmailAddress) -> Result<(), AuthError>;

    /// Redeem a reset token and set a new password.
    ///
    /// # Errors
    /// * `ResetTokenInvalid` - Token unknown, expired or already used
    async fn reset_password(&self, token: &str, new_password: Password)
        -> Result<(), AuthError>;

    /// Resolve an access token to the live caller.
    ///
    /// # Errors
    /// * `TokenExpired` / `TokenInvalid` - Token failed verification or user is gone
    async fn authenticate(&self, access_token: &str) -> Result<Actor, AuthError>;
}

/// Persistence operations for reset tokens.
#[async_trait]
pub trait ResetTokenRepository: Send + Sync + 'static {
    /// Store a new reset token.
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn create(&self, token: ResetToken) -> Result<(), AuthError>;

    /// Remove and return the token matching `token` exactly whose expiry
    /// is at or after `now`.
    ///
    /// Find and delete happen in one step, so a token is returned at most once.
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn consume(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<ResetToken>, AuthError>;

    /// Remove every token that expired before `now`.
    ///
    /// # Returns
    /// Number of tokens removed
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, AuthError>;
}

/// Outbound mail delivery.
#[async_trait]
pub trait Mailer: Send + Sync + 'static {
    /// Send an HTML message.
    ///
    /// # Errors
    /// * `InvalidAddress` - Sender or recipient cannot be parsed
    /// * `BuildFailed` - Message could not be assembled
    /// * `SendFailed` - Transport rejected the message
    async fn send(
        &self,
        to: &EmailAddress,
        subject: &str,
        html_body: &str,
    ) -> Result<(), MailerError>;
}
