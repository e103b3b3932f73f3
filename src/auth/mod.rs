use chrono::Utc;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::config;

/// Milliseconds per hour, for session expiry arithmetic
const MS_PER_HOUR: i64 = 60 * 60 * 1000;

/// Result of validating a submitted admin key
#[derive(Debug, Serialize, Deserialize)]
pub struct KeyValidation {
    pub valid: bool,
    #[serde(rename = "sessionToken")]
    pub session_token: Option<String>,
    #[serde(rename = "expiresAt")]
    pub expires_at: Option<i64>,
}

impl KeyValidation {
    pub fn denied() -> Self {
        Self {
            valid: false,
            session_token: None,
            expires_at: None,
        }
    }
}

#[derive(Debug)]
pub enum TokenError {
    Malformed,
    Forged,
    Expired,
}

impl std::fmt::Display for TokenError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenError::Malformed => write!(f, "Malformed session token"),
            TokenError::Forged => write!(f, "Session token signature mismatch"),
            TokenError::Expired => write!(f, "Session token expired"),
        }
    }
}

impl std::error::Error for TokenError {}

/// Compare a candidate key against the shared secret and mint a session
/// token on match. Takes the current time as a parameter so expiry math is
/// testable; the TTL comes from config. Callers pass
/// `Utc::now().timestamp_millis()` in production.
pub fn validate_key(candidate: &str, secret: &str, now_ms: i64) -> KeyValidation {
    if candidate != secret {
        return KeyValidation::denied();
    }

    let ttl_ms = config::config().security.session_ttl_hours as i64 * MS_PER_HOUR;
    KeyValidation {
        valid: true,
        session_token: Some(mint_session_token(secret, now_ms)),
        expires_at: Some(now_ms + ttl_ms),
    }
}

/// Session token format: `<issue-ms>-<first 32 hex chars of SHA-256("<issue-ms>-<secret>")>`.
///
/// The token is a self-describing capability: the issue timestamp travels in
/// the clear and the digest binds it to the secret, so verification needs no
/// server-side session storage.
pub fn mint_session_token(secret: &str, issued_at_ms: i64) -> String {
    format!("{}-{}", issued_at_ms, token_digest(secret, issued_at_ms))
}

/// Verify a presented session token: recompute the digest from the embedded
/// issue timestamp and check it has not outlived the session TTL.
/// Returns the issue timestamp on success.
pub fn verify_session_token(token: &str, secret: &str, now_ms: i64) -> Result<i64, TokenError> {
    let (ts_part, digest_part) = token.split_once('-').ok_or(TokenError::Malformed)?;
    let issued_at_ms: i64 = ts_part.parse().map_err(|_| TokenError::Malformed)?;

    if digest_part.len() != 32 {
        return Err(TokenError::Malformed);
    }

    if token_digest(secret, issued_at_ms) != digest_part {
        return Err(TokenError::Forged);
    }

    let ttl_ms = config::config().security.session_ttl_hours as i64 * MS_PER_HOUR;
    if now_ms >= issued_at_ms + ttl_ms {
        return Err(TokenError::Expired);
    }

    Ok(issued_at_ms)
}

fn token_digest(secret: &str, issued_at_ms: i64) -> String {
    let mut hasher = Sha256::new();
    hasher.update(format!("{}-{}", issued_at_ms, secret).as_bytes());
    let digest = hasher.finalize();

    let hex: String = digest.iter().map(|b| format!("{:02x}", b)).collect();
    hex[..32].to_string()
}

pub fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "secret123";

    #[test]
    fn wrong_key_is_denied_without_token() {
        let result = validate_key("foo", SECRET, 1_700_000_000_000);
        assert!(!result.valid);
        assert!(result.session_token.is_none());
        assert!(result.expires_at.is_none());
    }

    #[test]
    fn correct_key_mints_token_with_exact_ttl() {
        let now = 1_700_000_000_000;
        let result = validate_key(SECRET, SECRET, now);
        assert!(result.valid);
        assert_eq!(result.expires_at, Some(now + 24 * MS_PER_HOUR));

        let token = result.session_token.unwrap();
        let (ts, digest) = token.split_once('-').unwrap();
        assert_eq!(ts, now.to_string());
        assert_eq!(digest.len(), 32);
        assert!(digest.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn minted_token_round_trips_through_verify() {
        let now = 1_700_000_000_000;
        let token = mint_session_token(SECRET, now);
        let issued = verify_session_token(&token, SECRET, now + 1000).unwrap();
        assert_eq!(issued, now);
    }

    #[test]
    fn verify_rejects_expired_token() {
        let now = 1_700_000_000_000;
        let token = mint_session_token(SECRET, now);
        let later = now + 24 * MS_PER_HOUR;
        assert!(matches!(
            verify_session_token(&token, SECRET, later),
            Err(TokenError::Expired)
        ));
    }

    #[test]
    fn verify_rejects_forged_digest() {
        let now = 1_700_000_000_000;
        let token = format!("{}-{}", now, "0".repeat(32));
        assert!(matches!(
            verify_session_token(&token, SECRET, now),
            Err(TokenError::Forged)
        ));
    }

    #[test]
    fn verify_rejects_garbage() {
        assert!(matches!(
            verify_session_token("not-a-token", SECRET, 0),
            Err(TokenError::Malformed)
        ));
        assert!(matches!(
            verify_session_token("", SECRET, 0),
            Err(TokenError::Malformed)
        ));
    }

    #[test]
    fn token_issued_under_different_secret_fails() {
        let now = 1_700_000_000_000;
        let token = mint_session_token("other-secret", now);
        assert!(matches!(
            verify_session_token(&token, SECRET, now),
            Err(TokenError::Forged)
        ));
    }
}
