use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

/// Claims carried by both access and refresh tokens.
///
/// The two kinds share this shape and differ only in signing secret and
/// lifetime. `jti` makes every issued token unique, even when two tokens
/// for the same subject are issued within the same second.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenClaims {
    /// Subject (identity identifier)
    pub sub: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// JWT ID (unique token identifier)
    pub jti: String,
}

impl TokenClaims {
    /// Create claims for a subject, expiring `ttl` after `issued_at`.
    ///
    /// # Arguments
    /// * `subject` - Identity identifier
    /// * `issued_at` - Issuance instant
    /// * `ttl` - Token lifetime
    ///
    /// # Returns
    /// Claims with sub, iat, exp and a fresh jti
    pub fn new(subject: impl ToString, issued_at: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            sub: subject.to_string(),
            iat: issued_at.timestamp(),
            exp: (issued_at + ttl).timestamp(),
            jti: Uuid::new_v4().to_string(),
        }
    }

    /// Check if token is expired.
    ///
    /// A token is expired from the `exp` second onward.
    pub fn is_expired(&self, current_timestamp: i64) -> bool {
        current_timestamp >= self.exp
    }

    /// Expiration as a UTC instant.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }
}
