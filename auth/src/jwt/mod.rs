pub mod claims;
pub mod errors;
pub mod handler;
pub mod issuer;

pub use claims::TokenClaims;
pub use errors::JwtError;
pub use handler::JwtHandler;
pub use issuer::IssuedToken;
pub use issuer::TokenConfig;
pub use issuer::TokenIssuer;
pub use issuer::TokenKind;
