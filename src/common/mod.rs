// Common module - shared types and utilities across all modules

pub mod config;
pub mod dev_mode;
pub mod error;
pub mod helpers;
pub mod id_generator;
pub mod migrations;
pub mod state;
pub mod validation;

// Re-export commonly used types for convenience
pub use config::AppConfig;
pub use error::ApiError;
pub use helpers::{redact_sensitive_fields, safe_token_log};
pub use id_generator::{generate_token_id, generate_user_id};
pub use state::AppState;
pub use validation::{ValidationResult, Validator};
