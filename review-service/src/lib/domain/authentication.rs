pub mod errors;
pub mod models;
pub mod ports;
pub mod reset;
pub mod service;
pub mod session;
