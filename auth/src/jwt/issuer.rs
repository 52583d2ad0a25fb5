use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;

use super::claims::TokenClaims;
use super::errors::JwtError;
use super::handler::JwtHandler;

/// Kind of token; each kind has its own secret and lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Access,
    Refresh,
}

/// Signing secrets and lifetimes for both token kinds.
#[derive(Debug, Clone)]
pub struct TokenConfig {
    pub access_secret: String,
    pub access_ttl: Duration,
    pub refresh_secret: String,
    pub refresh_ttl: Duration,
}

/// A signed token together with the lifetime it was issued with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    pub token: String,
    pub ttl: Duration,
    pub expires_at: DateTime<Utc>,
}

/// Issues and verifies access and refresh tokens.
///
/// Access and refresh tokens are signed with disjoint secrets, so a token
/// of one kind never verifies as the other.
pub struct TokenIssuer {
    access: JwtHandler,
    refresh: JwtHandler,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenIssuer {
    /// Create an issuer from immutable token settings.
    ///
    /// # Errors
    /// * `InvalidConfiguration` - Empty or shared secrets, or a non-positive TTL
    pub fn new(config: &TokenConfig) -> Result<Self, JwtError> {
        if config.access_secret.is_empty() || config.refresh_secret.is_empty() {
            return Err(JwtError::InvalidConfiguration(
                "token secrets must not be empty".to_string(),
            ));
        }
        if config.access_secret == config.refresh_secret {
            return Err(JwtError::InvalidConfiguration(
                "access and refresh secrets must differ".to_string(),
            ));
        }
        if config.access_ttl <= Duration::zero() || config.refresh_ttl <= Duration::zero() {
            return Err(JwtError::InvalidConfiguration(
                "token lifetimes must be positive".to_string(),
            ));
        }

        Ok(Self {
            access: JwtHandler::new(config.access_secret.as_bytes()),
            refresh: JwtHandler::new(config.refresh_secret.as_bytes()),
            access_ttl: config.access_ttl,
            refresh_ttl: config.refresh_ttl,
        })
    }

    /// Lifetime used for tokens of `kind`.
    pub fn ttl(&self, kind: TokenKind) -> Duration {
        match kind {
            TokenKind::Access => self.access_ttl,
            TokenKind::Refresh => self.refresh_ttl,
        }
    }

    /// Issue an access token for `subject`, valid from now.
    pub fn issue_access(&self, subject: impl ToString) -> Result<IssuedToken, JwtError> {
        self.issue_at(TokenKind::Access, subject, Utc::now())
    }

    /// Issue a refresh token for `subject`, valid from now.
    ///
    /// The caller must persist the token's hash before handing it out.
    pub fn issue_refresh(&self, subject: impl ToString) -> Result<IssuedToken, JwtError> {
        self.issue_at(TokenKind::Refresh, subject, Utc::now())
    }

    /// Issue a token of `kind` as if the current time were `now`.
    ///
    /// # Errors
    /// * `EncodingFailed` - Token signing failed
    pub fn issue_at(
        &self,
        kind: TokenKind,
        subject: impl ToString,
        now: DateTime<Utc>,
    ) -> Result<IssuedToken, JwtError> {
        let ttl = self.ttl(kind);
        let claims = TokenClaims::new(subject, now, ttl);
        let token = self.handler(kind).encode(&claims)?;

        Ok(IssuedToken {
            token,
            ttl,
            expires_at: now + ttl,
        })
    }

    /// Verify a token of `kind` against the current time.
    pub fn verify(&self, token: &str, kind: TokenKind) -> Result<TokenClaims, JwtError> {
        self.verify_at(token, kind, Utc::now())
    }

    /// Verify a token of `kind` as if the current time were `now`.
    ///
    /// # Errors
    /// * `InvalidToken` - Empty token, wrong secret, or malformed token
    /// * `TokenExpired` - `now` is at or past the token's `exp`
    pub fn verify_at(
        &self,
        token: &str,
        kind: TokenKind,
        now: DateTime<Utc>,
    ) -> Result<TokenClaims, JwtError> {
        if token.is_empty() {
            return Err(JwtError::InvalidToken("empty token".to_string()));
        }

        let claims: TokenClaims = self.handler(kind).decode(token)?;

        if claims.is_expired(now.timestamp()) {
            return Err(JwtError::TokenExpired);
        }

        Ok(claims)
    }

    fn handler(&self, kind: TokenKind) -> &JwtHandler {
        match kind {
            TokenKind::Access => &self.access,
            TokenKind::Refresh => &self.refresh,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::SubsecRound;

    use super::*;

    fn test_config() -> TokenConfig {
        TokenConfig {
            access_secret: "access_secret_at_least_32_bytes_long!".to_string(),
            access_ttl: Duration::minutes(15),
            refresh_secret: "refresh_secret_at_least_32_bytes_long".to_string(),
            refresh_ttl: Duration::days(7),
        }
    }

    #[test]
    fn test_issue_and_verify_access() {
        let issuer = TokenIssuer::new(&test_config()).unwrap();

        let issued = issuer.issue_access("user123").expect("Failed to issue token");
        assert!(!issued.token.is_empty());
        assert_eq!(issued.ttl, Duration::minutes(15));

        let claims = issuer
            .verify(&issued.token, TokenKind::Access)
            .expect("Failed to verify token");
        assert_eq!(claims.sub, "user123");
        assert_eq!(claims.expires_at(), Some(issued.expires_at.trunc_subsecs(0)));
    }

    #[test]
    fn test_access_token_expires_after_ttl() {
        let issuer = TokenIssuer::new(&test_config()).unwrap();
        let issued_at = Utc::now();

        let issued = issuer
            .issue_at(TokenKind::Access, "user123", issued_at)
            .unwrap();

        let before = issued_at + Duration::minutes(14);
        assert!(issuer
            .verify_at(&issued.token, TokenKind::Access, before)
            .is_ok());

        let after = issued_at + Duration::minutes(15);
        assert_eq!(
            issuer.verify_at(&issued.token, TokenKind::Access, after),
            Err(JwtError::TokenExpired)
        );
    }

    #[test]
    fn test_refresh_token_outlives_access_token() {
        let issuer = TokenIssuer::new(&test_config()).unwrap();
        let issued_at = Utc::now();

        let refresh = issuer
            .issue_at(TokenKind::Refresh, "user123", issued_at)
            .unwrap();

        let later = issued_at + Duration::hours(1);
        let claims = issuer
            .verify_at(&refresh.token, TokenKind::Refresh, later)
            .expect("Refresh token should still be valid");
        assert_eq!(claims.sub, "user123");
    }

    #[test]
    fn test_kinds_are_not_interchangeable() {
        let issuer = TokenIssuer::new(&test_config()).unwrap();

        let access = issuer.issue_access("user123").unwrap();
        let refresh = issuer.issue_refresh("user123").unwrap();

        assert!(matches!(
            issuer.verify(&access.token, TokenKind::Refresh),
            Err(JwtError::InvalidToken(_))
        ));
        assert!(matches!(
            issuer.verify(&refresh.token, TokenKind::Access),
            Err(JwtError::InvalidToken(_))
        ));
    }

    #[test]
    fn test_verify_rejects_empty_and_tampered_tokens() {
        let issuer = TokenIssuer::new(&test_config()).unwrap();

        assert!(matches!(
            issuer.verify("", TokenKind::Access),
            Err(JwtError::InvalidToken(_))
        ));

        let issued = issuer.issue_access("user123").unwrap();
        let mut parts: Vec<&str> = issued.token.split('.').collect();
        let forged_payload = {
            let other = issuer.issue_access("admin").unwrap();
            other.token.split('.').nth(1).unwrap().to_string()
        };
        parts[1] = &forged_payload;
        let forged = parts.join(".");

        assert!(matches!(
            issuer.verify(&forged, TokenKind::Access),
            Err(JwtError::InvalidToken(_))
        ));
    }

    #[test]
    fn test_consecutive_tokens_differ() {
        let issuer = TokenIssuer::new(&test_config()).unwrap();
        let now = Utc::now();

        let first = issuer.issue_at(TokenKind::Refresh, "user123", now).unwrap();
        let second = issuer.issue_at(TokenKind::Refresh, "user123", now).unwrap();
        assert_ne!(first.token, second.token);
    }

    #[test]
    fn test_rejects_shared_secret() {
        let config = TokenConfig {
            refresh_secret: test_config().access_secret,
            ..test_config()
        };

        assert!(matches!(
            TokenIssuer::new(&config),
            Err(JwtError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_rejects_empty_secret_and_zero_ttl() {
        let empty_secret = TokenConfig {
            access_secret: String::new(),
            ..test_config()
        };
        assert!(TokenIssuer::new(&empty_secret).is_err());

        let zero_ttl = TokenConfig {
            access_ttl: Duration::zero(),
            ..test_config()
        };
        assert!(TokenIssuer::new(&zero_ttl).is_err());
    }
}
