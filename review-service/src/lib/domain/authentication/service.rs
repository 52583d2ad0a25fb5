use std::sync::Arc;

use async_trait::async_trait;
use auth::PasswordHasher;
use auth::TokenIssuer;
use auth::TokenKind;
use chrono::Utc;

use crate::domain::authentication::errors::AuthError;
use crate::domain::authentication::models::ChangePasswordCommand;
use crate::domain::authentication::models::RegisterCommand;
use crate::domain::authentication::models::SessionTokens;
use crate::domain::authentication::ports::AuthenticationServicePort;
use crate::domain::authentication::ports::Mailer;
use crate::domain::authentication::ports::ResetTokenRepository;
use crate::domain::authentication::reset::ResetTokenFlow;
use crate::domain::authentication::session::SessionStore;
use crate::domain::authorization::Actor;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::Password;
use crate::domain::user::models::Permission;
use crate::domain::user::models::PublicUser;
use crate::domain::user::models::Role;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::user::ports::UserRepository;

/// Salt length used when hashing passwords.
pub const PASSWORD_SALT_LENGTH: usize = 16;

/// Domain service for registration, log-in and session lifecycle.
///
/// Composes the password hasher, the token issuer, the session store and
/// the reset-token flow behind [`AuthenticationServicePort`].
pub struct AuthenticationService<UR, RR, M>
where
    UR: UserRepository,
    RR: ResetTokenRepository,
    M: Mailer,
{
    users: Arc<UR>,
    issuer: Arc<TokenIssuer>,
    hasher: PasswordHasher,
    /// Compared against when a log-in email is unknown
    placeholder_hash: String,
    sessions: SessionStore<UR>,
    resets: ResetTokenFlow<UR, RR, M>,
}

impl<UR, RR, M> AuthenticationService<UR, RR, M>
where
    UR: UserRepository,
    RR: ResetTokenRepository,
    M: Mailer,
{
    /// Create a new authentication service with injected dependencies.
    ///
    /// # Arguments
    /// * `users` - User persistence implementation
    /// * `reset_tokens` - Reset token persistence implementation
    /// * `mailer` - Outbound mail delivery
    /// * `issuer` - Access/refresh token issuer
    /// * `reset_link_base` - Link the reset token is appended to
    pub fn new(
        users: Arc<UR>,
        reset_tokens: Arc<RR>,
        mailer: Arc<M>,
        issuer: Arc<TokenIssuer>,
        reset_link_base: String,
    ) -> Self {
        let hasher = PasswordHasher::new();
        Self {
            placeholder_hash: hasher.placeholder(PASSWORD_SALT_LENGTH),
            sessions: SessionStore::new(Arc::clone(&users)),
            resets: ResetTokenFlow::new(
                Arc::clone(&users),
                reset_tokens,
                mailer,
                reset_link_base,
            ),
            users,
            issuer,
            hasher,
        }
    }

    /// Issue a new token pair and make its refresh token the current session.
    async fn start_session(&self, user: &User) -> Result<SessionTokens, AuthError> {
        let access = self.issuer.issue_access(user.id)?;
        let refresh = self.issuer.issue_refresh(user.id)?;
        self.sessions.start_session(&user.id, &refresh.token).await?;

        Ok(SessionTokens {
            user: PublicUser::from(user),
            access,
            refresh,
        })
    }
}

#[async_trait]
impl<UR, RR, M> AuthenticationServicePort for AuthenticationService<UR, RR, M>
where
    UR: UserRepository,
    RR: ResetTokenRepository,
    M: Mailer,
{
    async fn register(&self, command: RegisterCommand) -> Result<PublicUser, AuthError> {
        let password_hash = self
            .hasher
            .hash(command.password.as_str(), PASSWORD_SALT_LENGTH)?;

        let user = User {
            id: UserId::new(),
            username: command.username,
            email: command.email,
            role: Role::User,
            permissions: Permission::DEFAULTS.to_vec(),
            password_hash,
            refresh_token_hash: None,
            created_at: Utc::now(),
        };

        let created_user = self.users.create(user).await?;
        tracing::info!(user_id = %created_user.id, "User registered");

        Ok(PublicUser::from(&created_user))
    }

    async fn log_in(&self, email: &str, password: &str) -> Result<SessionTokens, AuthError> {
        let Some(user) = self.users.find_by_email(email).await? else {
            // Same key derivation as a wrong password
            self.hasher.compare(&self.placeholder_hash, password);
            tracing::warn!("Log-in with unknown email");
            return Err(AuthError::InvalidCredentials);
        };

        if !self.hasher.compare(&user.password_hash, password) {
            tracing::warn!(user_id = %user.id, "Log-in with wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        let tokens = self.start_session(&user).await?;
        tracing::info!(user_id = %user.id, "User logged in");

        Ok(tokens)
    }

    async fn refresh(&self, refresh_token: &str) -> Result<SessionTokens, AuthError> {
        let claims = self.issuer.verify(refresh_token, TokenKind::Refresh)?;
        let user_id = UserId::from_string(&claims.sub).map_err(|_| AuthError::TokenInvalid)?;

        let user = self
            .sessions
            .validate_session(&user_id, refresh_token)
            .await?;

        self.start_session(&user).await
    }

    async fn log_out(&self, id: &UserId) -> Result<(), AuthError> {
        self.sessions.end_session(id).await?;
        tracing::info!(user_id = %id, "User logged out");

        Ok(())
    }

    async fn change_password(
        &self,
        id: &UserId,
        command: ChangePasswordCommand,
    ) -> Result<PublicUser, AuthError> {
        let user = self
            .users
            .find_by_id(id)
            .await?
            .ok_or_else(|| AuthError::NotFound(id.to_string()))?;

        if !self.hasher.compare(&user.password_hash, &command.old_password) {
            return Err(AuthError::InvalidCredentials);
        }

        let password_hash = self
            .hasher
            .hash(command.new_password.as_str(), PASSWORD_SALT_LENGTH)?;
        self.users.update_password_hash(id, &password_hash).await?;
        tracing::info!(user_id = %id, "Password changed");

        Ok(PublicUser::from(&user))
    }

    async fn forgot_password(&self, email: &EmailAddress) -> Result<(), AuthError> {
        self.resets.request_reset(email).await
    }

    async fn reset_password(
        &self,
        token: &str,
        new_password: Password,
    ) -> Result<(), AuthError> {
        let user_id = self.resets.redeem(token, &new_password).await?;
        self.sessions.end_session(&user_id).await
    }

    async fn authenticate(&self, access_token: &str) -> Result<Actor, AuthError> {
        let claims = self.issuer.verify(access_token, TokenKind::Access)?;
        let user_id = UserId::from_string(&claims.sub).map_err(|_| AuthError::TokenInvalid)?;

        let user = self
            .users
            .find_by_id(&user_id)
            .await?
            .ok_or(AuthError::TokenInvalid)?;

        Ok(Actor::from(&user))
    }
}
