//! Authentication handlers

use axum::extract::{Extension, Json};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{error, info};

use super::extractors::AuthedUser;
use super::models::{AuthResponse, TelegramAuthPayload, User};
use super::validators::TelegramAuthValidator;
use crate::common::{ApiError, AppState, Validator};

/// POST /api/auth/telegram
/// Authenticates a Telegram Mini App user from WebApp `initData`
///
/// # Request Body
/// ```json
/// {
///   "init_data": "query_id=...&user=...&auth_date=...&hash=..."
/// }
/// ```
///
/// # Response
/// ```json
/// {
///   "token": "<session token>",
///   "expires_at": "2024-01-31T00:00:00+00:00",
///   "dev_session": false,
///   "user": { ... }
/// }
/// ```
pub async fn telegram_auth(
    Extension(state): Extension<Arc<AppState>>,
    Json(payload): Json<TelegramAuthPayload>,
) -> Result<Json<AuthResponse>, ApiError> {
    info!("Received Telegram auth request");

    let validation = TelegramAuthValidator.validate(&payload);
    if !validation.is_valid {
        return Err(validation.into());
    }

    let input = state.auth.resolve_input(&payload.init_data);
    let authenticated = state.auth.authenticate(input).await?;

    Ok(Json(AuthResponse {
        token: authenticated.token,
        expires_at: authenticated.expires_at.to_rfc3339(),
        dev_session: authenticated.dev_session,
        user: authenticated.user,
    }))
}

/// POST /api/auth/logout
/// Sessions are stateless; the client discards its token
pub async fn logout_handler(user: AuthedUser) -> Json<Value> {
    info!(
        user_id = %user.user.id,
        dev_session = user.dev_session,
        "User logged out"
    );
    Json(json!({ "ok": true }))
}

/// GET /api/me
pub async fn me_handler(user: AuthedUser) -> Json<User> {
    Json(user.user)
}

/// GET /health
pub async fn health_handler(
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Json<Value>, ApiError> {
    sqlx::query("SELECT 1")
        .execute(&state.db)
        .await
        .map_err(|e| {
            error!(error = %e, "Health check database ping failed");
            ApiError::ServiceUnavailable("database unavailable".to_string())
        })?;

    Ok(Json(json!({ "status": "ok" })))
}
