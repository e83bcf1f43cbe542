//! Authentication routes

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers;

/// Creates and returns the authentication router
///
/// # Routes
/// - `POST /api/auth/telegram` - Telegram Mini App login
/// - `POST /api/auth/logout` - Logout (client-side token removal)
/// - `GET /api/me` - Get current user information
/// - `GET /health` - Liveness check
pub fn auth_routes() -> Router {
    Router::new()
        .route("/api/auth/telegram", post(handlers::telegram_auth))
        .route("/api/auth/logout", post(handlers::logout_handler))
        .route("/api/me", get(handlers::me_handler))
        .route("/health", get(handlers::health_handler))
}
