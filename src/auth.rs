//! Request authentication primitives.
//!
//! - Bearer extraction from the `Authorization` header
//! - The [`Auth`] extractor used by every protected handler
//! - The ownership guard for per-resource mutation
//! - Opaque refresh-token generation

use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, header, request::Parts},
    response::{IntoResponse, Response},
};
use rand::RngCore;

use crate::jwt::JwtConfig;

/// Extract the bearer token from the `Authorization` header.
///
/// The header must have the exact shape `Bearer <token>` (case-sensitive
/// scheme, at least two whitespace-separated parts). The returned token is
/// the second part verbatim; its internal structure is not inspected.
pub fn get_bearer_token(headers: &HeaderMap) -> Result<String, AuthError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::MissingHeader)?;
    let value = value.to_str().map_err(|_| AuthError::MalformedHeader)?;

    let mut parts = value.split_whitespace();
    match (parts.next(), parts.next()) {
        (Some("Bearer"), Some(token)) => Ok(token.to_string()),
        _ => Err(AuthError::MalformedHeader),
    }
}

/// Generate an opaque refresh token: 32 bytes from the OS CSPRNG as
/// lowercase hex. Not derived from any user attribute.
pub fn make_refresh_token() -> String {
    let mut bytes = [0u8; 32];
    rand::rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Allow the action only when the acting user owns the resource.
pub fn authorize_owner(acting_user_id: &str, owner_id: &str) -> Result<(), AuthError> {
    if acting_user_id != owner_id {
        return Err(AuthError::Forbidden);
    }
    Ok(())
}

/// Authentication errors (returned as JSON).
#[derive(Debug, PartialEq, Eq)]
pub enum AuthError {
    MissingHeader,
    MalformedHeader,
    InvalidToken,
    Forbidden,
}

impl AuthError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            Self::MissingHeader | Self::MalformedHeader | Self::InvalidToken => {
                StatusCode::UNAUTHORIZED
            }
            Self::Forbidden => StatusCode::FORBIDDEN,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Self::MissingHeader => "Missing Authorization header",
            Self::MalformedHeader => "Malformed Authorization header",
            Self::InvalidToken => "Invalid or expired token",
            Self::Forbidden => "You don't own this resource",
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        use axum::Json;
        use serde::Serialize;

        #[derive(Serialize)]
        struct ErrorResponse {
            error: &'static str,
        }

        (
            self.status_code(),
            Json(ErrorResponse {
                error: self.message(),
            }),
        )
            .into_response()
    }
}

/// Trait for state types that support request authentication.
pub trait HasAuthState {
    fn jwt(&self) -> &JwtConfig;
}

/// Extractor for endpoints that require a valid access token.
/// Yields the authenticated user ID.
pub struct Auth(pub String);

impl<S> FromRequestParts<S> for Auth
where
    S: HasAuthState + Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = get_bearer_token(&parts.headers)?;

        let user_id = state.jwt().validate(&token).map_err(|e| {
            tracing::debug!("Access token rejected: {}", e);
            AuthError::InvalidToken
        })?;

        Ok(Auth(user_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with_auth(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static(value));
        headers
    }

    #[test]
    fn test_bearer_token_extracted() {
        let headers = headers_with_auth("Bearer abc123");
        assert_eq!(get_bearer_token(&headers).unwrap(), "abc123");
    }

    #[test]
    fn test_lowercase_scheme_rejected() {
        let headers = headers_with_auth("bearer abc123");
        assert_eq!(
            get_bearer_token(&headers),
            Err(AuthError::MalformedHeader)
        );
    }

    #[test]
    fn test_missing_header_rejected() {
        let headers = HeaderMap::new();
        assert_eq!(get_bearer_token(&headers), Err(AuthError::MissingHeader));
    }

    #[test]
    fn test_scheme_without_token_rejected() {
        let headers = headers_with_auth("Bearer");
        assert_eq!(
            get_bearer_token(&headers),
            Err(AuthError::MalformedHeader)
        );
    }

    #[test]
    fn test_extra_whitespace_tolerated() {
        let headers = headers_with_auth("Bearer   abc123");
        assert_eq!(get_bearer_token(&headers).unwrap(), "abc123");
    }

    #[test]
    fn test_refresh_token_shape() {
        let token = make_refresh_token();
        assert_eq!(token.len(), 64);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(token, token.to_lowercase());
    }

    #[test]
    fn test_refresh_tokens_unique() {
        assert_ne!(make_refresh_token(), make_refresh_token());
    }

    #[test]
    fn test_authorize_owner() {
        assert!(authorize_owner("u1", "u1").is_ok());
        assert_eq!(authorize_owner("u1", "u2"), Err(AuthError::Forbidden));
    }
}
