use std::env;

pub mod cors;
pub mod security;

pub use cors::create_cors_layer;
pub use security::create_security_headers_layer;

use crate::i18n::Locale;

pub struct Config {
    pub database_url: String,
    pub bind_addr: String,
    pub default_locale: Locale,
    pub smtp: SmtpConfig,
}

pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from_address: String,
    pub from_name: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "postgres://localhost/tessera".to_string()),
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3001".to_string()),
            default_locale: env::var("DEFAULT_LOCALE")
                .map(|tag| Locale::from_tag(&tag))
                .unwrap_or_default(),
            smtp: SmtpConfig::from_env(),
        }
    }
}

impl SmtpConfig {
    pub fn from_env() -> Self {
        Self {
            host: env::var("SMTP_HOST").unwrap_or_else(|_| "localhost".to_string()),
            port: env::var("SMTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(587),
            username: env::var("SMTP_USERNAME").unwrap_or_default(),
            password: env::var("SMTP_PASSWORD").unwrap_or_default(),
            from_address: env::var("MAIL_FROM_ADDRESS")
                .unwrap_or_else(|_| "tickets@localhost".to_string()),
            from_name: env::var("MAIL_FROM_NAME").unwrap_or_else(|_| "Ticket Office".to_string()),
        }
    }
}
