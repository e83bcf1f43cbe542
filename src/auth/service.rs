//! Telegram login orchestration.
//!
//! ```text
//! Start -> ParsingCredential -> Verifying -> CheckingFreshness
//!       -> ResolvingIdentity -> IssuingSession -> Done
//! ```
//!
//! Any stage may reject. A granted development bypass jumps from `Start`
//! straight to `ResolvingIdentity` with the mock identity.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, error, info, warn};

use super::error::{AuthError, ConfigFault};
use super::freshness::{check_freshness, parse_auth_date, MAX_AUTH_AGE_SECS};
use super::identity::resolve_user;
use super::init_data::{build_data_check_string, extract_identity, parse_init_data};
use super::models::{ExternalIdentity, SessionClaims, User};
use super::repository::UserRepository;
use super::session::{decode_session, issue_session, SessionKind};
use super::signature::verify_signature;
use crate::common::dev_mode::{DevBypass, DevModeConfig};
use crate::common::safe_token_log;

/// Signing secret used only by development deployments without `SESSION_SECRET`
const DEV_SESSION_SECRET: &str = "insecure-development-session-secret";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthStage {
    Start,
    ParsingCredential,
    Verifying,
    CheckingFreshness,
    ResolvingIdentity,
    IssuingSession,
    Done,
}

impl fmt::Display for AuthStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AuthStage::Start => "start",
            AuthStage::ParsingCredential => "parsing_credential",
            AuthStage::Verifying => "verifying",
            AuthStage::CheckingFreshness => "checking_freshness",
            AuthStage::ResolvingIdentity => "resolving_identity",
            AuthStage::IssuingSession => "issuing_session",
            AuthStage::Done => "done",
        };
        f.write_str(name)
    }
}

/// Login input, classified once at the HTTP boundary
#[derive(Debug)]
pub enum AuthInput {
    Credential(String),
    DevBypass(DevBypass),
}

#[derive(Debug, Clone)]
pub struct AuthSettings {
    pub bot_token: Option<String>,
    pub session_secret: Option<String>,
    pub dev_mode: DevModeConfig,
}

#[derive(Debug, Clone)]
pub struct Authenticated {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub user: User,
    pub dev_session: bool,
}

pub struct AuthService {
    settings: AuthSettings,
    users: Arc<dyn UserRepository>,
}

impl fmt::Debug for AuthService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthService")
            .field("bot_token", &self.settings.bot_token.as_ref().map(|_| "<redacted>"))
            .field(
                "session_secret",
                &self.settings.session_secret.as_ref().map(|_| "<redacted>"),
            )
            .field("dev_mode", &self.settings.dev_mode)
            .finish()
    }
}

impl AuthService {
    /// Empty secrets are treated as not configured.
    pub fn new(mut settings: AuthSettings, users: Arc<dyn UserRepository>) -> Self {
        settings.bot_token = settings.bot_token.filter(|s| !s.is_empty());
        settings.session_secret = settings.session_secret.filter(|s| !s.is_empty());
        Self { settings, users }
    }

    pub fn users(&self) -> &dyn UserRepository {
        self.users.as_ref()
    }

    /// Secret used to sign and verify session tokens. Production never falls
    /// back to a built-in value.
    pub fn signing_secret(&self) -> Option<&str> {
        match self.settings.session_secret.as_deref() {
            Some(secret) => Some(secret),
            None if self.settings.dev_mode.is_development() => Some(DEV_SESSION_SECRET),
            None => None,
        }
    }

    pub fn resolve_input(&self, blob: &str) -> AuthInput {
        match self
            .settings
            .dev_mode
            .grant_bypass(blob, self.settings.bot_token.is_some())
        {
            Some(grant) => AuthInput::DevBypass(grant),
            None => AuthInput::Credential(blob.to_string()),
        }
    }

    pub async fn authenticate(&self, input: AuthInput) -> Result<Authenticated, AuthError> {
        self.authenticate_at(input, Utc::now()).await
    }

    pub async fn authenticate_at(
        &self,
        input: AuthInput,
        now: DateTime<Utc>,
    ) -> Result<Authenticated, AuthError> {
        let (identity, kind) = match input {
            AuthInput::DevBypass(_grant) => {
                if !self.settings.dev_mode.bypass_enabled() {
                    return Err(self.reject(AuthStage::Start, AuthError::MissingSignature));
                }
                warn!(
                    telegram_id = crate::common::dev_mode::DEV_TELEGRAM_ID,
                    "DEV MODE: Telegram signature verification bypassed"
                );
                (
                    self.settings.dev_mode.mock_identity(now.timestamp()),
                    SessionKind::Development,
                )
            }
            AuthInput::Credential(blob) => {
                (self.verify_credential(&blob, now)?, SessionKind::Standard)
            }
        };

        let user = resolve_user(self.users.as_ref(), &identity)
            .await
            .map_err(|e| self.reject(AuthStage::ResolvingIdentity, e))?;

        let session = issue_session(
            self.signing_secret(),
            &user.id,
            user.telegram_id,
            kind,
            now,
        )
        .map_err(|e| self.reject(AuthStage::IssuingSession, e))?;

        info!(
            stage = %AuthStage::Done,
            user_id = %user.id,
            telegram_id = user.telegram_id,
            dev_session = kind == SessionKind::Development,
            "User authenticated via Telegram"
        );

        Ok(Authenticated {
            token: session.token,
            expires_at: session.expires_at,
            user,
            dev_session: kind == SessionKind::Development,
        })
    }

    /// Stages up to and including identity extraction; nothing here touches
    /// the user store.
    fn verify_credential(
        &self,
        blob: &str,
        now: DateTime<Utc>,
    ) -> Result<ExternalIdentity, AuthError> {
        let bot_token = self.settings.bot_token.as_deref().ok_or_else(|| {
            self.reject(
                AuthStage::Start,
                AuthError::ServerConfig(ConfigFault::ApplicationSecretMissing),
            )
        })?;

        let (fields, signature) =
            parse_init_data(blob).map_err(|e| self.reject(AuthStage::ParsingCredential, e))?;

        let data_check_string = build_data_check_string(&fields);
        debug!(
            fields = fields.len(),
            signature = %safe_token_log(&signature),
            "Verifying Telegram credential"
        );

        if !verify_signature(&data_check_string, &signature, bot_token) {
            return Err(self.reject(AuthStage::Verifying, AuthError::InvalidSignature));
        }

        let auth_date = parse_auth_date(&fields)
            .and_then(|auth_date| {
                check_freshness(auth_date, now.timestamp(), MAX_AUTH_AGE_SECS)?;
                Ok(auth_date)
            })
            .map_err(|e| self.reject(AuthStage::CheckingFreshness, e))?;

        extract_identity(&fields, auth_date)
            .map_err(|e| self.reject(AuthStage::ResolvingIdentity, e))
    }

    /// Verify a session token issued by [`AuthService::authenticate`]
    pub fn verify_session(&self, token: &str) -> Result<SessionClaims, AuthError> {
        let secret = self
            .signing_secret()
            .ok_or(AuthError::ServerConfig(ConfigFault::SigningSecretMissing))?;

        decode_session(token, secret).map_err(|e| {
            debug!(error = %e, token = %safe_token_log(token), "Session token rejected");
            AuthError::InvalidSignature
        })
    }

    fn reject(&self, stage: AuthStage, err: AuthError) -> AuthError {
        match &err {
            AuthError::ServerConfig(fault) => error!(
                stage = %stage,
                reason = err.code(),
                fault = fault.as_str(),
                "Telegram authentication unavailable: server misconfigured"
            ),
            AuthError::StoreUnavailable(detail) => error!(
                stage = %stage,
                reason = err.code(),
                error = %detail,
                "Telegram authentication failed: user store unavailable"
            ),
            _ => warn!(
                stage = %stage,
                reason = err.code(),
                error = %err,
                "Telegram authentication rejected"
            ),
        }
        err
    }
}
