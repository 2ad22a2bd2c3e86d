//! Application configuration loaded from environment variables.

use std::env;

use scribe_infra::{JwtConfig, MailConfig};

#[cfg(feature = "postgres")]
use scribe_infra::DatabaseConfig;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    #[cfg(feature = "postgres")]
    pub database: Option<DatabaseConfig>,
    pub jwt: JwtConfig,
    pub mail: MailConfig,
    /// HTTP relay for outbound mail. Mail is only logged when unset.
    pub mail_relay_url: Option<String>,
    /// Argon2 iteration count, from `SALT`.
    pub password_cost: Option<u32>,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            #[cfg(feature = "postgres")]
            database: DatabaseConfig::from_env(),
            jwt: JwtConfig::from_env(),
            mail: MailConfig::from_env(),
            mail_relay_url: env::var("MAIL_RELAY_URL").ok().filter(|u| !u.is_empty()),
            password_cost: env::var("SALT").ok().and_then(|s| s.parse().ok()),
        }
    }
}
