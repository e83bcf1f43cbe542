// Application state shared across all modules

use sqlx::SqlitePool;
use std::sync::Arc;

use crate::auth::service::AuthService;

/// Application state containing the database pool and the login service
#[derive(Clone, Debug)]
pub struct AppState {
    pub db: SqlitePool,
    pub auth: Arc<AuthService>,
}
