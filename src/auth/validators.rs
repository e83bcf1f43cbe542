//! Request validation for the login endpoint

use super::models::TelegramAuthPayload;
use crate::common::{ValidationResult, Validator};

/// Telegram initData is a few hundred bytes; anything near this is not a login
pub const MAX_INIT_DATA_LEN: usize = 8192;

pub struct TelegramAuthValidator;

impl Validator<TelegramAuthPayload> for TelegramAuthValidator {
    /// Only rejects oversized bodies. An empty credential is passed through so
    /// it is reported as a missing signature.
    fn validate(&self, data: &TelegramAuthPayload) -> ValidationResult {
        let mut result = ValidationResult::new();

        if data.init_data.len() > MAX_INIT_DATA_LEN {
            result.add_error(
                "init_data",
                &format!("must be at most {} bytes", MAX_INIT_DATA_LEN),
            );
        }

        result
    }
}
