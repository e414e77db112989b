/**
 * Admin Session Tokens
 * Stateless signed JWTs: the whole session lives in the token itself
 */
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

lazy_static::lazy_static! {
    /// Signing secret from environment
    pub static ref JWT_SECRET: String = std::env::var("JWT_SECRET")
        .unwrap_or_else(|_| "default-jwt-secret-change-in-production".to_string());
}

/// Session lifetime in hours
pub const SESSION_EXPIRY_HOURS: i64 = 24;

/// The single admin identity carried by every session
pub const ADMIN_SUBJECT: &str = "admin";
pub const ADMIN_ROLE: &str = "admin";

/// Session claims
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String,  // Fixed subject
    pub role: String, // Fixed role
    pub iat: i64,     // Issued at timestamp
    pub exp: i64,     // Expiry timestamp
}

/// Issue a session token valid for 24 hours from now.
pub fn issue() -> Result<String, jsonwebtoken::errors::Error> {
    issue_at(Utc::now())
}

/// Issue a session token as of a given instant. Split out so expiry can be
/// exercised in tests without waiting a day.
pub fn issue_at(now: DateTime<Utc>) -> Result<String, jsonwebtoken::errors::Error> {
    let claims = Claims {
        sub: ADMIN_SUBJECT.to_string(),
        role: ADMIN_ROLE.to_string(),
        iat: now.timestamp(),
        exp: (now + Duration::hours(SESSION_EXPIRY_HOURS)).timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(JWT_SECRET.as_bytes()),
    )
}

/// Verify a session token: signature and expiry, nothing else.
///
/// Leeway is zero so a token is rejected the second it expires, not a
/// minute later.
pub fn verify(token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    let mut validation = Validation::default();
    validation.leeway = 0;

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(JWT_SECRET.as_bytes()),
        &validation,
    )?;
    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_then_verify_roundtrip() {
        let token = issue().unwrap();
        let claims = verify(&token).unwrap();
        assert_eq!(claims.sub, ADMIN_SUBJECT);
        assert_eq!(claims.role, ADMIN_ROLE);
        assert_eq!(claims.exp - claims.iat, SESSION_EXPIRY_HOURS * 3600);
    }

    #[test]
    fn test_token_valid_just_before_expiry() {
        // Issued 23h59m ago: still inside the 24h window.
        let token = issue_at(Utc::now() - Duration::hours(24) + Duration::minutes(1)).unwrap();
        assert!(verify(&token).is_ok());
    }

    #[test]
    fn test_token_rejected_after_expiry() {
        let token = issue_at(Utc::now() - Duration::hours(24) - Duration::seconds(1)).unwrap();
        assert!(verify(&token).is_err());
    }

    #[test]
    fn test_tampered_token_rejected() {
        let token = issue().unwrap();

        // Flip one character in the middle of the payload segment. The last
        // character of a segment is avoided: its low bits can fall in the
        // base64 remainder and decode to the same bytes.
        let dot = token.find('.').unwrap();
        let payload_mid = dot + 1 + (token[dot + 1..].find('.').unwrap() / 2);
        let mut bytes = token.into_bytes();
        bytes[payload_mid] = if bytes[payload_mid] == b'A' { b'B' } else { b'A' };
        let tampered = String::from_utf8(bytes).unwrap();

        assert!(verify(&tampered).is_err());
    }

    #[test]
    fn test_garbage_token_rejected() {
        assert!(verify("not.a.token").is_err());
        assert!(verify("").is_err());
    }
}
