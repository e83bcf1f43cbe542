// src/common/dev_mode.rs
//! Development deployment flags and the Telegram login bypass.
//!
//! The bypass lets a developer log in without a real Telegram client. It is
//! only ever granted when the deployment is Development AND dev auth is
//! enabled; in a Production deployment [`DevModeConfig::grant_bypass`]
//! always returns `None`.

use tracing::{info, warn};

use crate::auth::models::ExternalIdentity;

/// Credential blob that requests the development bypass
pub const DEV_SENTINEL: &str = "dev_mode_test";

/// Telegram id of the mock development user
pub const DEV_TELEGRAM_ID: i64 = 100_000_001;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deployment {
    Development,
    Production,
}

impl Deployment {
    /// Anything other than an explicit development value is Production.
    pub fn from_env_value(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_lowercase()).as_deref() {
            Some("development" | "dev" | "local") => Deployment::Development,
            _ => Deployment::Production,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Deployment::Development => "development",
            Deployment::Production => "production",
        }
    }
}

/// Proof that the development bypass was granted. Only
/// [`DevModeConfig::grant_bypass`] constructs one.
#[derive(Debug)]
pub struct DevBypass {
    _granted: (),
}

#[derive(Debug, Clone)]
pub struct DevModeConfig {
    pub deployment: Deployment,
    pub auth_enabled: bool,
    pub user_first_name: String,
    pub user_username: String,
}

impl DevModeConfig {
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let deployment = Deployment::from_env_value(lookup("ENVIRONMENT").as_deref());

        let auth_enabled = lookup("DEV_AUTH_ENABLED")
            .unwrap_or_else(|| "false".to_string())
            .to_lowercase()
            == "true";

        let user_first_name = lookup("DEV_USER_FIRST_NAME").unwrap_or_else(|| "Dev".to_string());

        let user_username = lookup("DEV_USER_USERNAME").unwrap_or_else(|| "dev_user".to_string());

        Self {
            deployment,
            auth_enabled,
            user_first_name,
            user_username,
        }
    }

    pub fn is_development(&self) -> bool {
        self.deployment == Deployment::Development
    }

    pub fn bypass_enabled(&self) -> bool {
        self.is_development() && self.auth_enabled
    }

    /// Decide once, at the request boundary, whether a login skips signature
    /// verification.
    pub fn grant_bypass(&self, blob: &str, app_secret_configured: bool) -> Option<DevBypass> {
        if !self.bypass_enabled() {
            return None;
        }

        if !app_secret_configured || blob.trim() == DEV_SENTINEL {
            Some(DevBypass { _granted: () })
        } else {
            None
        }
    }

    /// Fixed identity used for bypassed logins
    pub fn mock_identity(&self, now: i64) -> ExternalIdentity {
        ExternalIdentity {
            external_id: DEV_TELEGRAM_ID,
            first_name: self.user_first_name.clone(),
            last_name: Some("User".to_string()),
            username: Some(self.user_username.clone()),
            photo_url: None,
            auth_date: now,
        }
    }
}

/// Log dev mode status on startup
pub fn log_dev_mode_status(config: &DevModeConfig) {
    if config.bypass_enabled() {
        warn!(
            deployment = config.deployment.as_str(),
            dev_user = %config.user_username,
            telegram_id = DEV_TELEGRAM_ID,
            "DEV AUTH ENABLED: Telegram signature checks can be bypassed. DO NOT USE IN PRODUCTION"
        );
    } else if config.auth_enabled {
        warn!(
            deployment = config.deployment.as_str(),
            "DEV_AUTH_ENABLED ignored outside a development deployment"
        );
    } else {
        info!(
            deployment = config.deployment.as_str(),
            "Telegram authentication required"
        );
    }
}

/// CLI argument parsing for dev auth
pub fn parse_dev_mode_args<I: IntoIterator<Item = String>>(args: I) -> Option<bool> {
    for arg in args {
        match arg.as_str() {
            "--dev" | "--dev-auth" => return Some(true),
            "--no-dev" | "--prod" | "--production" => return Some(false),
            _ => {}
        }
    }

    None
}

/// Override dev auth from CLI args. The deployment itself is never changed.
pub fn apply_cli_override<I: IntoIterator<Item = String>>(
    mut config: DevModeConfig,
    args: I,
) -> DevModeConfig {
    if let Some(cli_dev_auth) = parse_dev_mode_args(args) {
        info!(dev_auth = cli_dev_auth, "CLI override: DEV_AUTH_ENABLED");
        config.auth_enabled = cli_dev_auth;
    }

    config
}
