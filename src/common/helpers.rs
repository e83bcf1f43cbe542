// Helper functions for safe logging

use serde_json::Value;

/// JSON fields whose values must never reach the logs
pub const SENSITIVE_FIELDS: &[&str] = &["init_data", "initData", "token", "hash"];

/// Masks tokens for safe logging
/// Shows only first and last 4 characters
///
/// # Example
/// ```ignore
/// let masked = safe_token_log("eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9");
/// // Returns: "eyJh...CJ9"
/// ```
pub fn safe_token_log(token: &str) -> String {
    let chars: Vec<char> = token.chars().collect();
    if chars.len() > 8 {
        let head: String = chars[..4].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{head}...{tail}")
    } else {
        "***".to_string()
    }
}

/// Replace sensitive values anywhere in a JSON document with a masked form
pub fn redact_sensitive_fields(value: &mut Value) {
    match value {
        Value::Object(map) => {
            for (key, field) in map.iter_mut() {
                if SENSITIVE_FIELDS.contains(&key.as_str()) {
                    if let Value::String(s) = field {
                        *field = Value::String(safe_token_log(s));
                    } else {
                        *field = Value::String("***".to_string());
                    }
                } else {
                    redact_sensitive_fields(field);
                }
            }
        }
        Value::Array(items) => items.iter_mut().for_each(redact_sensitive_fields),
        _ => {}
    }
}
