//! Access token signing and validation.
//!
//! Access tokens are self-contained HS256 JWTs verified without a database
//! lookup. Refresh tokens are opaque database-backed strings and never pass
//! through this module.

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Issuer claim embedded in every access token. Tokens minted by another
/// service sharing the same secret are rejected on this claim.
pub const ACCESS_TOKEN_ISSUER: &str = "tubed-access";

/// Access token lifetime granted at login: 30 days
pub const LOGIN_ACCESS_TTL_MS: u64 = 30 * 24 * 60 * 60 * 1000;

/// Access token lifetime granted on refresh: 1 hour
pub const REFRESH_ACCESS_TTL_MS: u64 = 60 * 60 * 1000;

/// Refresh token lifetime: 60 days
pub const REFRESH_TOKEN_TTL_MS: u64 = 60 * 24 * 60 * 60 * 1000;

/// JWT claims for access tokens.
///
/// `iss` and `sub` default to empty strings on decode so that a token
/// missing either claim fails the explicit checks below instead of failing
/// deserialization with a generic error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Issuer
    #[serde(default)]
    pub iss: String,
    /// Subject (user ID)
    #[serde(default)]
    pub sub: String,
    /// Issued at (Unix timestamp, seconds)
    pub iat: u64,
    /// Expiration time (Unix timestamp, seconds)
    pub exp: u64,
}

/// Configuration for JWT operations. Built once from the shared secret and
/// threaded through handler state; there is no process-wide singleton.
#[derive(Clone)]
pub struct JwtConfig {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtConfig {
    /// Create a new JWT configuration with the given secret.
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
        }
    }

    /// Issue an access token for a user.
    ///
    /// The TTL is taken in milliseconds but claims carry whole seconds, so
    /// the lifetime is floored to the second.
    pub fn issue(&self, user_id: &str, ttl_millis: u64) -> Result<String, JwtError> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|_| JwtError::TimeError)?
            .as_secs();

        let claims = AccessClaims {
            iss: ACCESS_TOKEN_ISSUER.to_string(),
            sub: user_id.to_string(),
            iat: now,
            exp: now + ttl_millis / 1000,
        };

        jsonwebtoken::encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(JwtError::Encoding)
    }

    /// Validate an access token and return the authenticated user ID.
    ///
    /// Checks, in order: signature and expiry (zero leeway), issuer,
    /// non-empty subject.
    pub fn validate(&self, token: &str) -> Result<String, JwtError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        let token_data =
            jsonwebtoken::decode::<AccessClaims>(token, &self.decoding_key, &validation)
                .map_err(JwtError::Decoding)?;

        if token_data.claims.iss != ACCESS_TOKEN_ISSUER {
            return Err(JwtError::InvalidIssuer);
        }

        if token_data.claims.sub.is_empty() {
            return Err(JwtError::MissingSubject);
        }

        Ok(token_data.claims.sub)
    }
}

/// Current Unix time in seconds. Refresh-token bookkeeping passes `now`
/// into the store explicitly so tests can pin it.
pub fn unix_now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// Errors that can occur during JWT operations.
#[derive(Debug)]
pub enum JwtError {
    /// Error encoding the token
    Encoding(jsonwebtoken::errors::Error),
    /// Error decoding the token (bad signature, malformed, expired)
    Decoding(jsonwebtoken::errors::Error),
    /// System time error
    TimeError,
    /// Issuer claim does not match [`ACCESS_TOKEN_ISSUER`]
    InvalidIssuer,
    /// Subject claim absent or empty
    MissingSubject,
}

impl std::fmt::Display for JwtError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JwtError::Encoding(e) => write!(f, "Failed to encode token: {}", e),
            JwtError::Decoding(e) => write!(f, "Failed to decode token: {}", e),
            JwtError::TimeError => write!(f, "System time error"),
            JwtError::InvalidIssuer => write!(f, "Invalid issuer"),
            JwtError::MissingSubject => write!(f, "Missing subject (user ID)"),
        }
    }
}

impl std::error::Error for JwtError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_and_validate() {
        let config = JwtConfig::new(b"test-secret-key-for-testing");

        let token = config.issue("user-123", 60_000).unwrap();
        assert!(!token.is_empty());

        let user_id = config.validate(&token).unwrap();
        assert_eq!(user_id, "user-123");
    }

    #[test]
    fn test_ttl_millis_floored_to_seconds() {
        let config = JwtConfig::new(b"test-secret-key-for-testing");

        let token = config.issue("user-123", 1500).unwrap();

        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        let data = jsonwebtoken::decode::<AccessClaims>(
            &token,
            &DecodingKey::from_secret(b"test-secret-key-for-testing"),
            &validation,
        )
        .unwrap();

        assert_eq!(data.claims.exp - data.claims.iat, 1);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let config1 = JwtConfig::new(b"secret-1");
        let config2 = JwtConfig::new(b"secret-2");

        let token = config1.issue("user-123", 60_000).unwrap();
        assert!(config2.validate(&token).is_err());
    }

    #[test]
    fn test_tampered_token_rejected() {
        let config = JwtConfig::new(b"test-secret-key-for-testing");

        let token = config.issue("user-123", 60_000).unwrap();

        // Flip the last character of the signature
        let mut tampered = token.clone();
        let last = tampered.pop().unwrap();
        tampered.push(if last == 'A' { 'B' } else { 'A' });

        assert!(config.validate(&tampered).is_err());
    }

    #[test]
    fn test_malformed_token_rejected() {
        let config = JwtConfig::new(b"test-secret-key-for-testing");
        assert!(config.validate("not-a-jwt").is_err());
        assert!(config.validate("").is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        let secret = b"test-secret";
        let now = unix_now_secs();

        let claims = AccessClaims {
            iss: ACCESS_TOKEN_ISSUER.to_string(),
            sub: "user-123".to_string(),
            iat: now - 100,
            exp: now - 50, // Expired 50 seconds ago
        };
        let token = jsonwebtoken::encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret),
        )
        .unwrap();

        let config = JwtConfig::new(secret);
        assert!(config.validate(&token).is_err());
    }

    #[test]
    fn test_wrong_issuer_rejected() {
        let secret = b"test-secret";
        let now = unix_now_secs();

        let claims = AccessClaims {
            iss: "some-other-service".to_string(),
            sub: "user-123".to_string(),
            iat: now,
            exp: now + 60,
        };
        let token = jsonwebtoken::encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret),
        )
        .unwrap();

        let config = JwtConfig::new(secret);
        assert!(matches!(
            config.validate(&token),
            Err(JwtError::InvalidIssuer)
        ));
    }

    #[test]
    fn test_empty_subject_rejected() {
        let secret = b"test-secret";
        let now = unix_now_secs();

        let claims = AccessClaims {
            iss: ACCESS_TOKEN_ISSUER.to_string(),
            sub: String::new(),
            iat: now,
            exp: now + 60,
        };
        let token = jsonwebtoken::encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret),
        )
        .unwrap();

        let config = JwtConfig::new(secret);
        assert!(matches!(
            config.validate(&token),
            Err(JwtError::MissingSubject)
        ));
    }
}
