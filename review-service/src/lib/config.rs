use std::env;

use auth::TokenConfig;
use config::Config as ConfigBuilder;
use config::ConfigError;
use config::Environment;
use config::File;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub jwt: JwtConfig,
    pub mail: MailConfig,
    pub cookies: CookieConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub http_port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct JwtConfig {
    pub access_secret: String,
    pub access_expiration_seconds: i64,
    pub refresh_secret: String,
    pub refresh_expiration_seconds: i64,
}

impl JwtConfig {
    /// Token settings for the issuer, with lifetimes as durations.
    pub fn token_config(&self) -> TokenConfig {
        TokenConfig {
            access_secret: self.access_secret.clone(),
            access_ttl: chrono::Duration::seconds(self.access_expiration_seconds),
            refresh_secret: self.refresh_secret.clone(),
            refresh_ttl: chrono::Duration::seconds(self.refresh_expiration_seconds),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct MailConfig {
    /// SMTP relay host; empty runs the mailer in log-only mode
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_username: Option<String>,
    pub smtp_password: Option<String>,
    pub from: String,
    /// Link the reset token is appended to as `?token=...`
    pub reset_link_base: String,
    pub use_starttls: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CookieConfig {
    pub secure: bool,
}

impl Config {
    /// Load configuration from files with environment variable overrides
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (DATABASE__URL, JWT__ACCESS_SECRET, etc.)
    /// 2. Environment-specific config file (config/{environment}.toml)
    /// 3. Default config file (config/default.toml)
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let configuration = ConfigBuilder::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Example: MAIL__SMTP_HOST=smtp.example.com overrides mail.smtp_host
            .add_source(Environment::with_prefix("").separator("__"))
            .build()?;

        configuration.try_deserialize()
    }
}
