//! Authentication data models

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Session token claims
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SessionClaims {
    /// Local user id
    pub sub: String,
    /// Telegram user id
    pub tg_id: i64,
    pub iat: usize,
    pub exp: usize,
    pub jti: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub dev: bool,
}

/// User database model
#[derive(FromRow, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: String,
    pub telegram_id: i64,
    pub first_name: String,
    pub last_name: Option<String>,
    pub username: Option<String>,
    pub avatar_url: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Profile fields used to provision a user on first login
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub telegram_id: i64,
    pub first_name: String,
    pub last_name: Option<String>,
    pub username: Option<String>,
    pub avatar_url: Option<String>,
}

impl From<&ExternalIdentity> for NewUser {
    fn from(identity: &ExternalIdentity) -> Self {
        Self {
            telegram_id: identity.external_id,
            first_name: identity.first_name.clone(),
            last_name: identity.last_name.clone(),
            username: identity.username.clone(),
            avatar_url: identity.photo_url.clone(),
        }
    }
}

/// Partial profile update. `None` leaves a column untouched; for nullable
/// columns `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileChanges {
    pub first_name: Option<String>,
    pub last_name: Option<Option<String>>,
    pub username: Option<Option<String>>,
    pub avatar_url: Option<Option<String>>,
}

impl ProfileChanges {
    /// Fields of `incoming` that differ from the stored record
    pub fn diff(stored: &User, incoming: &NewUser) -> Self {
        fn changed(stored: &Option<String>, incoming: &Option<String>) -> Option<Option<String>> {
            (stored != incoming).then(|| incoming.clone())
        }

        Self {
            first_name: (stored.first_name != incoming.first_name)
                .then(|| incoming.first_name.clone()),
            last_name: changed(&stored.last_name, &incoming.last_name),
            username: changed(&stored.username, &incoming.username),
            avatar_url: changed(&stored.avatar_url, &incoming.avatar_url),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.first_name.is_none()
            && self.last_name.is_none()
            && self.username.is_none()
            && self.avatar_url.is_none()
    }

    pub fn changed_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.first_name.is_some() {
            fields.push("first_name");
        }
        if self.last_name.is_some() {
            fields.push("last_name");
        }
        if self.username.is_some() {
            fields.push("username");
        }
        if self.avatar_url.is_some() {
            fields.push("avatar_url");
        }
        fields
    }
}

/// The `user` object embedded in Telegram `initData`
#[derive(Deserialize, Debug, Clone)]
pub struct TelegramUser {
    pub id: i64,
    pub first_name: String,
    pub last_name: Option<String>,
    pub username: Option<String>,
    pub photo_url: Option<String>,
}

/// Identity extracted from a verified credential
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalIdentity {
    pub external_id: i64,
    pub first_name: String,
    pub last_name: Option<String>,
    pub username: Option<String>,
    pub photo_url: Option<String>,
    pub auth_date: i64,
}

impl ExternalIdentity {
    pub fn from_telegram(user: TelegramUser, auth_date: i64) -> Self {
        Self {
            external_id: user.id,
            first_name: user.first_name,
            last_name: user.last_name,
            username: user.username,
            photo_url: user.photo_url,
            auth_date,
        }
    }
}

/// Telegram login request body
#[derive(Deserialize, Debug)]
pub struct TelegramAuthPayload {
    #[serde(alias = "initData")]
    pub init_data: String,
}

/// Successful login response body
#[derive(Serialize, Debug)]
pub struct AuthResponse {
    pub token: String,
    pub expires_at: String,
    pub dev_session: bool,
    pub user: User,
}
