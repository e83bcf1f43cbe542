//! Telegram WebApp signature verification.
//!
//! ```text
//! secret_key = HMAC-SHA256(key = "WebAppData", message = bot_token)
//! hash       = hex(HMAC-SHA256(key = secret_key, message = data_check_string))
//! ```
//!
//! Verification fails closed: any error while computing the expected signature yields
//! `false`.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use tracing::debug;

type HmacSha256 = Hmac<Sha256>;

/// Key label fixed by Telegram's WebApp signing scheme
const WEB_APP_KEY_LABEL: &[u8] = b"WebAppData";

fn hmac_sha256(key: &[u8], message: &[u8]) -> Option<Vec<u8>> {
    let mut mac = HmacSha256::new_from_slice(key).ok()?;
    mac.update(message);
    Some(mac.finalize().into_bytes().to_vec())
}

/// Per-bot secret derived from the bot token
pub fn derive_secret_key(bot_token: &str) -> Option<Vec<u8>> {
    hmac_sha256(WEB_APP_KEY_LABEL, bot_token.as_bytes())
}

/// Hex signature Telegram would attach to `data_check_string`
pub fn compute_signature(data_check_string: &str, bot_token: &str) -> Option<String> {
    let secret_key = derive_secret_key(bot_token)?;
    hmac_sha256(&secret_key, data_check_string.as_bytes()).map(hex::encode)
}

/// Check a `hash` against the data-check-string in constant time.
///
/// `signature` must be the exact lowercase hex Telegram sends. It is not
/// trimmed or case-folded.
pub fn verify_signature(data_check_string: &str, signature: &str, bot_token: &str) -> bool {
    let Some(expected) = compute_signature(data_check_string, bot_token) else {
        debug!("Failed to compute expected signature");
        return false;
    };

    if expected.len() != signature.len() {
        debug!(signature_len = signature.len(), "Signature has the wrong length");
        return false;
    }

    expected.as_bytes().ct_eq(signature.as_bytes()).into()
}
