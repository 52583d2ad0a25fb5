use auth::IssuedToken;
use chrono::DateTime;
use chrono::Utc;

use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::Password;
use crate::domain::user::models::PublicUser;
use crate::domain::user::models::UserId;
use crate::domain::user::models::Username;

/// One-time password reset token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResetToken {
    pub token: String,
    pub user_id: UserId,
    pub expire_date: DateTime<Utc>,
}

impl ResetToken {
    /// Whether the token can still be redeemed at `now`.
    pub fn is_redeemable_at(&self, now: DateTime<Utc>) -> bool {
        self.expire_date >= now
    }
}

/// Command to register a new account.
///
/// Role and permissions are not part of the command; registration always
/// grants the default set.
#[derive(Debug)]
pub struct RegisterCommand {
    pub username: Username,
    pub email: EmailAddress,
    pub password: Password,
}

/// Command to change the password of an authenticated user.
#[derive(Debug)]
pub struct ChangePasswordCommand {
    pub old_password: String,
    pub new_password: Password,
}

/// Token pair handed out by log-in and refresh.
#[derive(Debug, Clone)]
pub struct SessionTokens {
    pub user: PublicUser,
    pub access: IssuedToken,
    pub refresh: IssuedToken,
}
