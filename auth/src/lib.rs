//! Credential utilities library
//!
//! Provides the reusable building blocks of the review service's
//! credential core:
//! - Salted, memory-hard secret hashing (Argon2id) with constant-time comparison
//! - Paired access/refresh token issuance and verification (HS256 JWT)
//!
//! Session persistence and authorization decisions live in the service;
//! this crate holds no state beyond its immutable configuration.
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::new();
//! let stored = hasher.hash("my_password", 16).unwrap();
//! assert!(hasher.compare(&stored, "my_password"));
//! assert!(!hasher.compare(&stored, "other_password"));
//! ```
//!
//! ## Access and Refresh Tokens
//! ```
//! use auth::{TokenConfig, TokenIssuer, TokenKind};
//! use chrono::Duration;
//!
//! let issuer = TokenIssuer::new(&TokenConfig {
//!     access_secret: "access_secret_at_least_32_bytes_long!".to_string(),
//!     access_ttl: Duration::minutes(15),
//!     refresh_secret: "refresh_secret_at_least_32_bytes_long".to_string(),
//!     refresh_ttl: Duration::days(7),
//! })
//! .unwrap();
//!
//! let access = issuer.issue_access("user123").unwrap();
//! let claims = issuer.verify(&access.token, TokenKind::Access).unwrap();
//! assert_eq!(claims.sub, "user123");
//!
//! // A token never verifies as the other kind
//! assert!(issuer.verify(&access.token, TokenKind::Refresh).is_err());
//! ```

pub mod jwt;
pub mod password;

// Re-export commonly used items
pub use jwt::IssuedToken;
pub use jwt::JwtError;
pub use jwt::JwtHandler;
pub use jwt::TokenClaims;
pub use jwt::TokenConfig;
pub use jwt::TokenIssuer;
pub use jwt::TokenKind;
pub use password::PasswordError;
pub use password::PasswordHasher;
