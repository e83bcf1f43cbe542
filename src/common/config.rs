// src/common/config.rs
//! Process configuration read from the environment

use std::env;

use super::dev_mode::DevModeConfig;

const DEFAULT_CORS_ORIGINS: &str = "http://localhost:3000,http://localhost:5173";

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub port: u16,
    pub cors_origins: Vec<String>,
    /// Telegram bot token, the application secret for initData signatures
    pub bot_token: Option<String>,
    /// Secret for signing session tokens
    pub session_secret: Option<String>,
    pub dev_mode: DevModeConfig,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("database_url", &self.database_url)
            .field("port", &self.port)
            .field("cors_origins", &self.cors_origins)
            .field("bot_token", &self.bot_token.as_ref().map(|_| "<redacted>"))
            .field("session_secret", &self.session_secret.as_ref().map(|_| "<redacted>"))
            .field("dev_mode", &self.dev_mode)
            .finish()
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_vars(|key| env::var(key).ok())
    }

    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let database_url =
            non_empty(lookup("DATABASE_URL")).unwrap_or_else(|| "sqlite://tasktrack.db".to_string());

        let port = lookup("PORT")
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(8080);

        let cors_origins = lookup("CORS_ORIGINS")
            .unwrap_or_else(|| DEFAULT_CORS_ORIGINS.to_string())
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        let bot_token = non_empty(lookup("TELEGRAM_BOT_TOKEN"));
        let session_secret =
            non_empty(lookup("SESSION_SECRET")).or_else(|| non_empty(lookup("JWT_SECRET")));

        Self {
            database_url,
            port,
            cors_origins,
            bot_token,
            session_secret,
            dev_mode: DevModeConfig::from_vars(lookup),
        }
    }
}
