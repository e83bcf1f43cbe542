//! Authentication extractors for Axum

use async_trait::async_trait;
use axum::{
    extract::{Extension, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};
use std::sync::Arc;
use tracing::{debug, error, warn};

use super::error::AuthError;
use super::models::User;
use crate::common::{ApiError, AppState};

/// Authenticated user extractor
///
/// Validates the session token from the `Authorization` header and loads the
/// user it names. There is no dev bypass here: development logins receive a
/// real (short-lived) session token from the login endpoint.
#[derive(Debug)]
pub struct AuthedUser {
    pub user: User,
    pub dev_session: bool,
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthedUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Extension(app_state): Extension<Arc<AppState>> =
            Extension::from_request_parts(parts, state)
                .await
                .map_err(|_| ApiError::InternalServer("missing app state".to_string()))?;

        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .map(str::trim)
            .filter(|t| !t.is_empty());

        let Some(token) = token else {
            warn!("Authentication failed: missing Authorization header");
            return Err(ApiError::Unauthorized("missing auth".into()));
        };

        // Handle "Bearer <token>" format or raw token
        let bare_token = token.strip_prefix("Bearer ").unwrap_or(token).trim();

        let claims = match app_state.auth.verify_session(bare_token) {
            Ok(claims) => claims,
            Err(err @ AuthError::ServerConfig(_)) => {
                error!(reason = err.code(), "Cannot verify session tokens: server misconfigured");
                return Err(err.into());
            }
            Err(_) => return Err(ApiError::Unauthorized("invalid token".into())),
        };

        let user = app_state
            .auth
            .users()
            .find_by_id(&claims.sub)
            .await
            .map_err(|e| {
                error!(error = %e, user_id = %claims.sub, "User lookup failed during authentication");
                ApiError::from(AuthError::from(e))
            })?;

        match user {
            Some(user) if user.telegram_id == claims.tg_id => {
                debug!(
                    user_id = %user.id,
                    telegram_id = user.telegram_id,
                    dev_session = claims.dev,
                    "User authentication successful via extractor"
                );
                Ok(AuthedUser {
                    user,
                    dev_session: claims.dev,
                })
            }
            Some(user) => {
                warn!(
                    user_id = %user.id,
                    "Authentication failed: token telegram id does not match user"
                );
                Err(ApiError::Unauthorized("invalid token".into()))
            }
            None => {
                warn!(user_id = %claims.sub, "Authentication failed: user not found in database");
                Err(ApiError::Unauthorized("user not found".into()))
            }
        }
    }
}
