use std::fmt;
use std::str::FromStr;

use chrono::DateTime;
use chrono::Utc;
use uuid::Uuid;

use crate::user::errors::EmailError;
use crate::user::errors::PasswordPolicyError;
use crate::user::errors::RoleError;
use crate::user::errors::UserIdError;
use crate::user::errors::UsernameError;

/// User aggregate entity.
///
/// Holds the credential state of a registered user. `password_hash` and
/// `refresh_token_hash` never leave the service; use [`PublicUser`] for
/// anything returned to a client.
#[derive(Debug, Clone)]
pub struct User {
    pub id: UserId,
    pub username: Username,
    pub email: EmailAddress,
    pub role: Role,
    pub permissions: Vec<Permission>,
    pub password_hash: String,
    /// Hash of the only refresh token currently accepted; `None` when logged out
    pub refresh_token_hash: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Outward projection of a user without credential material.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicUser {
    pub id: UserId,
    pub username: Username,
    pub email: EmailAddress,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for PublicUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            created_at: user.created_at,
        }
    }
}

/// User unique identifier type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UserId(pub Uuid);

impl UserId {
    /// Generate a new random user ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse a user ID from string.
    ///
    /// # Errors
    /// * `InvalidFormat` - String is not a valid UUID
    pub fn from_string(s: &str) -> Result<Self, UserIdError> {
        Uuid::parse_str(s)
            .map(UserId)
            .map_err(|e| UserIdError::InvalidFormat(e.to_string()))
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Username value type
///
/// Ensures username is 3-32 characters and contains only alphanumeric, underscore, and hyphen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Username(String);

impl Username {
    const MIN_LENGTH: usize = 3;
    const MAX_LENGTH: usize = 32;

    /// Create a new valid username.
    ///
    /// # Errors
    /// * `TooShort` - Username shorter than 3 characters
    /// * `TooLong` - Username longer than 32 characters
    /// * `InvalidCharacters` - Contains non-alphanumeric characters (except _ and -)
    pub fn new(username: String) -> Result<Self, UsernameError> {
        let length = username.chars().count();
        if length < Self::MIN_LENGTH {
            return Err(UsernameError::TooShort {
                min: Self::MIN_LENGTH,
                actual: length,
            });
        }
        if length > Self::MAX_LENGTH {
            return Err(UsernameError::TooLong {
                max: Self::MAX_LENGTH,
                actual: length,
            });
        }
        if !username
            .chars()
            .all(|c| c.is_alphanumeric() || c == '_' || c == '-')
        {
            return Err(UsernameError::InvalidCharacters);
        }

        Ok(Self(username))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Email address type
///
/// Validates email format using RFC 5322 compliant parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Create a new validated email address.
    ///
    /// # Errors
    /// * `InvalidFormat` - Email does not conform to RFC 5322
    pub fn new(email: String) -> Result<Self, EmailError> {
        email_address::EmailAddress::from_str(&email)
            .map(|_| EmailAddress(email))
            .map_err(|e| EmailError::InvalidFormat(e.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Plaintext password that satisfies the password policy.
///
/// 4-20 characters with at least one lowercase letter, one uppercase
/// letter, and one digit or non-word character. Only ever handed to the
/// password hasher.
#[derive(Clone, PartialEq, Eq)]
pub struct Password(String);

impl Password {
    const MIN_LENGTH: usize = 4;
    const MAX_LENGTH: usize = 20;

    /// Validate a new password against the policy.
    ///
    /// # Errors
    /// * `TooShort` / `TooLong` - Outside 4-20 characters
    /// * `MissingLowercase` / `MissingUppercase` - Letter case requirement not met
    /// * `MissingDigitOrSymbol` - Neither a digit nor a non-word character present
    pub fn new(password: String) -> Result<Self, PasswordPolicyError> {
        let length = password.chars().count();
        if length < Self::MIN_LENGTH {
            return Err(PasswordPolicyError::TooShort {
                min: Self::MIN_LENGTH,
                actual: length,
            });
        }
        if length > Self::MAX_LENGTH {
            return Err(PasswordPolicyError::TooLong {
                max: Self::MAX_LENGTH,
                actual: length,
            });
        }
        if !password.chars().any(|c| c.is_lowercase()) {
            return Err(PasswordPolicyError::MissingLowercase);
        }
        if !password.chars().any(|c| c.is_uppercase()) {
            return Err(PasswordPolicyError::MissingUppercase);
        }
        if !password
            .chars()
            .any(|c| c.is_ascii_digit() || !(c.is_alphanumeric() || c == '_'))
        {
            return Err(PasswordPolicyError::MissingDigitOrSymbol);
        }

        Ok(Self(password))
    }

    /// Validate a password together with its confirmation field.
    ///
    /// # Errors
    /// * `Mismatch` - The two values differ
    /// * Any policy error from [`Password::new`]
    pub fn confirmed(password: String, repeat: &str) -> Result<Self, PasswordPolicyError> {
        if password != repeat {
            return Err(PasswordPolicyError::Mismatch);
        }
        Self::new(password)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(***)")
    }
}

/// Coarse role of a user. `Admin` bypasses every authorization check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }
}

impl FromStr for Role {
    type Err = RoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "admin" => Ok(Role::Admin),
            other => Err(RoleError::UnknownRole(other.to_string())),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fine-grained capability checked together with resource ownership.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Permission {
    CreateReview,
    UpdateReview,
    DeleteReview,
    UpdateUser,
    DeleteUser,
}

impl Permission {
    /// Every permission the service knows about.
    pub const ALL: [Permission; 5] = [
        Permission::CreateReview,
        Permission::UpdateReview,
        Permission::DeleteReview,
        Permission::UpdateUser,
        Permission::DeleteUser,
    ];

    /// Permissions granted to every newly registered user.
    pub const DEFAULTS: [Permission; 5] = [
        Permission::CreateReview,
        Permission::UpdateReview,
        Permission::DeleteReview,
        Permission::UpdateUser,
        Permission::DeleteUser,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::CreateReview => "create_review",
            Permission::UpdateReview => "update_review",
            Permission::DeleteReview => "delete_review",
            Permission::UpdateUser => "update_user",
            Permission::DeleteUser => "delete_user",
        }
    }
}

impl FromStr for Permission {
    type Err = RoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Permission::ALL
            .into_iter()
            .find(|permission| permission.as_str() == s)
            .ok_or_else(|| RoleError::UnknownPermission(s.to_string()))
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Command to update an existing user with optional validated fields.
///
/// Only provided fields will be updated.
#[derive(Debug)]
pub struct UpdateUserCommand {
    pub username: Option<Username>,
    pub email: Option<EmailAddress>,
}

/// Command to replace a user's role and permission set.
#[derive(Debug)]
pub struct UpdateAccessCommand {
    pub role: Role,
    pub permissions: Vec<Permission>,
}

impl UpdateAccessCommand {
    /// Parse role and permission names.
    ///
    /// Duplicate permissions are collapsed.
    ///
    /// # Errors
    /// * `UnknownRole` / `UnknownPermission` - Name does not match a known value
    pub fn parse(role: &str, permissions: &[String]) -> Result<Self, RoleError> {
        let role = role.parse()?;
        let mut parsed: Vec<Permission> = Vec::with_capacity(permissions.len());
        for name in permissions {
            let permission = name.parse()?;
            if !parsed.contains(&permission) {
                parsed.push(permission);
            }
        }

        Ok(Self {
            role,
            permissions: parsed,
        })
    }
}
