pub mod authentication;
pub mod authorization;
pub mod user;
