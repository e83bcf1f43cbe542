//! `auth_date` freshness policy

use super::error::AuthError;
use super::init_data::{InitDataFields, AUTH_DATE_FIELD};

/// Credentials older than this are rejected (24 hours)
pub const MAX_AUTH_AGE_SECS: i64 = 86_400;

/// Read `auth_date` as Unix seconds. A credential without a usable
/// timestamp cannot be shown to be fresh.
pub fn parse_auth_date(fields: &InitDataFields) -> Result<i64, AuthError> {
    fields
        .get(AUTH_DATE_FIELD)
        .and_then(|raw| raw.parse::<i64>().ok())
        .ok_or(AuthError::StaleCredential)
}

pub fn check_freshness(auth_date: i64, now: i64, max_age: i64) -> Result<(), AuthError> {
    if now.saturating_sub(auth_date) > max_age {
        Err(AuthError::StaleCredential)
    } else {
        Ok(())
    }
}
