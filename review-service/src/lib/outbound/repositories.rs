pub mod reset_token;
pub mod user;

pub use reset_token::PostgresResetTokenRepository;
pub use user::PostgresUserRepository;
