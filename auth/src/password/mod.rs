pub mod errors;
pub mod hasher;

pub use errors::PasswordError;
pub use hasher::PasswordHasher;
pub use hasher::DERIVED_KEY_LENGTH;
pub use hasher::MIN_SALT_LENGTH;
