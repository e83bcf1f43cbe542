//! Error taxonomy for the Telegram login flow

use axum::http::StatusCode;
use thiserror::Error;

use super::repository::RepoError;

/// Server-side configuration faults. Only ever logged, never shown to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFault {
    ApplicationSecretMissing,
    SigningSecretMissing,
    TokenEncoding,
}

impl ConfigFault {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfigFault::ApplicationSecretMissing => "application secret missing",
            ConfigFault::SigningSecretMissing => "signing secret missing",
            ConfigFault::TokenEncoding => "session token encoding failed",
        }
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("credential has no signature")]
    MissingSignature,

    #[error("credential signature does not match")]
    InvalidSignature,

    #[error("credential is too old")]
    StaleCredential,

    #[error("malformed identity: {0}")]
    MalformedIdentity(String),

    #[error("server configuration error: {}", .0.as_str())]
    ServerConfig(ConfigFault),

    #[error("user store unavailable: {0}")]
    StoreUnavailable(String),
}

impl AuthError {
    /// Stable machine-readable reason code
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::MissingSignature => "MISSING_SIGNATURE",
            AuthError::InvalidSignature => "INVALID_SIGNATURE",
            AuthError::StaleCredential => "STALE_CREDENTIAL",
            AuthError::MalformedIdentity(_) => "MALFORMED_IDENTITY",
            AuthError::ServerConfig(_) => "SERVER_CONFIG_ERROR",
            AuthError::StoreUnavailable(_) => "STORE_UNAVAILABLE",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::MissingSignature
            | AuthError::InvalidSignature
            | AuthError::StaleCredential => StatusCode::UNAUTHORIZED,
            AuthError::MalformedIdentity(_) => StatusCode::BAD_REQUEST,
            AuthError::ServerConfig(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AuthError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Only store outages are worth retrying with the same credential.
    pub fn is_retryable(&self) -> bool {
        matches!(self, AuthError::StoreUnavailable(_))
    }

    /// Message safe to return to the client. Carries no internal detail.
    pub fn public_message(&self) -> &'static str {
        match self {
            AuthError::MissingSignature => "credential is missing its signature",
            AuthError::InvalidSignature => "credential signature is invalid",
            AuthError::StaleCredential => "credential has expired, please reopen the app",
            AuthError::MalformedIdentity(_) => "credential user data is malformed",
            AuthError::ServerConfig(_) => "authentication is not available",
            AuthError::StoreUnavailable(_) => "authentication temporarily unavailable, retry later",
        }
    }
}

impl From<RepoError> for AuthError {
    fn from(err: RepoError) -> Self {
        AuthError::StoreUnavailable(err.to_string())
    }
}
