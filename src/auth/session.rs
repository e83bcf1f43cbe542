//! Session token issuance and verification (HS256 JWT)

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use tracing::error;

use super::error::{AuthError, ConfigFault};
use super::models::SessionClaims;
use crate::common::generate_token_id;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionKind {
    Standard,
    Development,
}

impl SessionKind {
    pub fn ttl(self) -> Duration {
        match self {
            SessionKind::Standard => Duration::days(30),
            SessionKind::Development => Duration::days(7),
        }
    }
}

#[derive(Debug, Clone)]
pub struct IssuedSession {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

pub fn issue_session(
    signing_secret: Option<&str>,
    user_id: &str,
    telegram_id: i64,
    kind: SessionKind,
    now: DateTime<Utc>,
) -> Result<IssuedSession, AuthError> {
    let secret = signing_secret
        .filter(|s| !s.is_empty())
        .ok_or(AuthError::ServerConfig(ConfigFault::SigningSecretMissing))?;

    let expires_at = now + kind.ttl();
    let claims = SessionClaims {
        sub: user_id.to_string(),
        tg_id: telegram_id,
        iat: now.timestamp() as usize,
        exp: expires_at.timestamp() as usize,
        jti: generate_token_id(),
        dev: kind == SessionKind::Development,
    };

    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| {
        error!(error = %e, user_id = %user_id, "JWT encoding error during session issuance");
        AuthError::ServerConfig(ConfigFault::TokenEncoding)
    })?;

    Ok(IssuedSession { token, expires_at })
}

/// Check signature and expiry of a session token
pub fn decode_session(
    token: &str,
    signing_secret: &str,
) -> Result<SessionClaims, jsonwebtoken::errors::Error> {
    decode::<SessionClaims>(
        token,
        &DecodingKey::from_secret(signing_secret.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )
    .map(|data| data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test_session_secret";

    #[test]
    fn test_issue_and_decode() {
        let now = Utc::now();
        let session =
            issue_session(Some(SECRET), "U_ABC123", 42, SessionKind::Standard, now).unwrap();

        let claims = decode_session(&session.token, SECRET).unwrap();
        assert_eq!(claims.sub, "U_ABC123");
        assert_eq!(claims.tg_id, 42);
        assert!(!claims.dev);
        assert!(claims.jti.starts_with("K_"));
        assert_eq!(claims.iat, now.timestamp() as usize);
        assert_eq!(claims.exp - claims.iat, 30 * 86_400);
        assert_eq!(session.expires_at, now + Duration::days(30));
    }

    #[test]
    fn test_development_session_is_shorter_and_flagged() {
        let now = Utc::now();
        let session =
            issue_session(Some(SECRET), "U_DEV001", 1, SessionKind::Development, now).unwrap();

        let claims = decode_session(&session.token, SECRET).unwrap();
        assert!(claims.dev);
        assert_eq!(claims.exp - claims.iat, 7 * 86_400);
    }

    #[test]
    fn test_missing_secret_is_config_error() {
        for secret in [None, Some("")] {
            let result = issue_session(secret, "U_X", 1, SessionKind::Standard, Utc::now());
            assert!(matches!(
                result,
                Err(AuthError::ServerConfig(ConfigFault::SigningSecretMissing))
            ));
        }
    }

    #[test]
    fn test_decode_rejects_wrong_secret() {
        let session =
            issue_session(Some(SECRET), "U_X", 1, SessionKind::Standard, Utc::now()).unwrap();
        assert!(decode_session(&session.token, "another_secret").is_err());
    }

    #[test]
    fn test_decode_rejects_expired_token() {
        let issued_at = Utc::now() - Duration::days(31);
        let session =
            issue_session(Some(SECRET), "U_X", 1, SessionKind::Standard, issued_at).unwrap();
        assert!(decode_session(&session.token, SECRET).is_err());
    }
}
