//! Telegram WebApp `initData` parsing and data-check-string construction.
//!
//! `initData` is a query string such as
//!
//! ```text
//! query_id=AAHd...&user=%7B%22id%22%3A1%7D&auth_date=1700000000&hash=eb9f...
//! ```
//!
//! Every field except `hash` takes part in the signature. Values are kept
//! exactly as received: the data-check-string is built from the raw text, and
//! only the `user` field is decoded, after the signature has been verified.

use super::error::AuthError;
use super::models::{ExternalIdentity, TelegramUser};

pub const HASH_FIELD: &str = "hash";
pub const USER_FIELD: &str = "user";
pub const AUTH_DATE_FIELD: &str = "auth_date";

/// Credential fields in first-seen order, last value wins per key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InitDataFields {
    entries: Vec<(String, String)>,
}

impl InitDataFields {
    pub fn insert(&mut self, key: &str, value: &str) {
        match self.entries.iter_mut().find(|(k, _)| k == key) {
            Some(entry) => entry.1 = value.to_string(),
            None => self.entries.push((key.to_string(), value.to_string())),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        let index = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(index).1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: AsRef<str>, V: AsRef<str>> FromIterator<(K, V)> for InitDataFields {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut fields = Self::default();
        for (key, value) in iter {
            fields.insert(key.as_ref(), value.as_ref());
        }
        fields
    }
}

/// Split a credential blob into its fields and the `hash` signature.
///
/// # Errors
/// [`AuthError::MissingSignature`] when the blob has no non-empty `hash`.
pub fn parse_init_data(blob: &str) -> Result<(InitDataFields, String), AuthError> {
    let mut fields: InitDataFields = blob
        .trim()
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| pair.split_once('=').unwrap_or((pair, "")))
        .collect();

    match fields.remove(HASH_FIELD) {
        Some(signature) if !signature.is_empty() => Ok((fields, signature)),
        _ => Err(AuthError::MissingSignature),
    }
}

/// Build the string Telegram signed: `key=value` lines sorted by key
/// (byte order), joined with `\n`.
pub fn build_data_check_string(fields: &InitDataFields) -> String {
    let mut entries: Vec<(&str, &str)> = fields.iter().collect();
    entries.sort_unstable_by(|a, b| a.0.as_bytes().cmp(b.0.as_bytes()));

    entries
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Decode the `user` field of an already verified credential.
pub fn extract_identity(
    fields: &InitDataFields,
    auth_date: i64,
) -> Result<ExternalIdentity, AuthError> {
    let raw = fields
        .get(USER_FIELD)
        .ok_or_else(|| AuthError::MalformedIdentity("user field missing".to_string()))?;

    // Form encoding: '+' stands for a space
    let plus_decoded = raw.replace('+', " ");
    let json = urlencoding::decode(&plus_decoded)
        .map_err(|_| AuthError::MalformedIdentity("user field is not valid UTF-8".to_string()))?;

    let user: TelegramUser = serde_json::from_str(&json)
        .map_err(|e| AuthError::MalformedIdentity(format!("user field: {e}")))?;

    Ok(ExternalIdentity::from_telegram(user, auth_date))
}
