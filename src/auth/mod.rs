//! # Auth Module
//!
//! Telegram Mini App login:
//! - `initData` parsing and data-check-string construction
//! - HMAC-SHA256 signature verification and freshness policy
//! - Local user provisioning and profile sync
//! - Session token issuance and the AuthedUser extractor

pub mod error;
pub mod extractors;
pub mod freshness;
pub mod handlers;
pub mod identity;
pub mod init_data;
pub mod models;
pub mod repository;
pub mod routes;
pub mod service;
pub mod session;
pub mod signature;
pub mod validators;

#[cfg(test)]
mod testutil;

pub use repository::SqliteUserRepository;
pub use routes::auth_routes;
pub use service::{AuthService, AuthSettings};
