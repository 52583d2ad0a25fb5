use std::sync::Arc;

use auth::PasswordHasher;
use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use rand::distributions::Alphanumeric;
use rand::Rng;

use crate::domain::authentication::errors::AuthError;
use crate::domain::authentication::models::ResetToken;
use crate::domain::authentication::ports::Mailer;
use crate::domain::authentication::ports::ResetTokenRepository;
use crate::domain::authentication::service::PASSWORD_SALT_LENGTH;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::Password;
use crate::domain::user::models::UserId;
use crate::user::ports::UserRepository;

/// Length of a generated reset token.
pub const RESET_TOKEN_LENGTH: usize = 64;

const RESET_MAIL_SUBJECT: &str = "Reset Password";

/// Lifetime of a reset token, counted from its creation.
pub fn reset_token_ttl() -> Duration {
    Duration::hours(1)
}

/// Issues one-time password reset tokens and redeems them.
pub struct ResetTokenFlow<UR, RR, M>
where
    UR: UserRepository,
    RR: ResetTokenRepository,
    M: Mailer,
{
    users: Arc<UR>,
    tokens: Arc<RR>,
    mailer: Arc<M>,
    hasher: PasswordHasher,
    reset_link_base: String,
}

impl<UR, RR, M> ResetTokenFlow<UR, RR, M>
where
    UR: UserRepository,
    RR: ResetTokenRepository,
    M: Mailer,
{
    pub fn new(users: Arc<UR>, tokens: Arc<RR>, mailer: Arc<M>, reset_link_base: String) -> Self {
        Self {
            users,
            tokens,
            mailer,
            hasher: PasswordHasher::new(),
            reset_link_base,
        }
    }

    /// Create a reset token for `email` and mail the redemption link.
    ///
    /// Unknown emails complete without creating anything. Tokens that have
    /// already expired are removed before the new one is stored. A mail
    /// delivery failure is logged and does not fail the call.
    pub async fn request_reset(&self, email: &EmailAddress) -> Result<(), AuthError> {
        self.request_reset_at(email, Utc::now()).await
    }

    pub async fn request_reset_at(
        &self,
        email: &EmailAddress,
        now: DateTime<Utc>,
    ) -> Result<(), AuthError> {
        let Some(user) = self.users.find_by_email(email.as_str()).await? else {
            tracing::info!("Password reset requested for an unknown email");
            return Ok(());
        };

        let purged = self.tokens.purge_expired(now).await?;
        if purged > 0 {
            tracing::debug!(purged, "Expired reset tokens removed");
        }

        let reset_token = ResetToken {
            token: generate_token(),
            user_id: user.id,
            expire_date: now + reset_token_ttl(),
        };
        self.tokens.create(reset_token.clone()).await?;
        tracing::info!(user_id = %user.id, "Password reset token created");

        let html_body = self.reset_mail_body(&reset_token.token);
        if let Err(e) = self
            .mailer
            .send(&user.email, RESET_MAIL_SUBJECT, &html_body)
            .await
        {
            tracing::error!(user_id = %user.id, error = %e, "Failed to send password reset mail");
        }

        Ok(())
    }

    /// Consume `token` and set the user's password to `new_password`.
    ///
    /// # Returns
    /// The user whose password was reset
    ///
    /// # Errors
    /// * `ResetTokenInvalid` - Token never existed, expired, or was already used
    pub async fn redeem(&self, token: &str, new_password: &Password) -> Result<UserId, AuthError> {
        self.redeem_at(token, new_password, Utc::now()).await
    }

    pub async fn redeem_at(
        &self,
        token: &str,
        new_password: &Password,
        now: DateTime<Utc>,
    ) -> Result<UserId, AuthError> {
        let reset_token = self
            .tokens
            .consume(token, now)
            .await?
            .ok_or(AuthError::ResetTokenInvalid)?;

        let password_hash = self
            .hasher
            .hash(new_password.as_str(), PASSWORD_SALT_LENGTH)?;
        self.users
            .update_password_hash(&reset_token.user_id, &password_hash)
            .await?;
        tracing::info!(user_id = %reset_token.user_id, "Password reset redeemed");

        Ok(reset_token.user_id)
    }

    fn reset_mail_body(&self, token: &str) -> String {
        let link = format!("{}?token={}", self.reset_link_base, token);
        format!(
            "<p>A password reset was requested for your account.</p>\
             <p><a href=\"{link}\">Reset Password</a></p>\
             <p>This link expires in 1 hour. If you did not request it, ignore this email.</p>"
        )
    }
}

fn generate_token() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(RESET_TOKEN_LENGTH)
        .map(char::from)
        .collect()
}
