//! Session endpoints.
//!
//! - POST `/login` - Verify credentials, mint access + refresh tokens
//! - POST `/refresh` - Exchange an active refresh token for a new access token
//! - POST `/revoke` - Revoke a refresh token (idempotent)
//!
//! The refresh token is never rotated: it stays valid until its own expiry
//! or an explicit revoke, and login does not invalidate earlier sessions.

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::post,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error};

use super::error::{ApiError, ResultExt};
use crate::auth::{get_bearer_token, make_refresh_token};
use crate::db::{Database, User};
use crate::jwt::{
    JwtConfig, LOGIN_ACCESS_TTL_MS, REFRESH_ACCESS_TTL_MS, REFRESH_TOKEN_TTL_MS, unix_now_secs,
};
use crate::password::verify_password;

#[derive(Clone)]
pub struct AuthState {
    pub db: Database,
    pub jwt: Arc<JwtConfig>,
}

pub fn router(state: AuthState) -> Router {
    Router::new()
        .route("/login", post(login))
        .route("/refresh", post(refresh))
        .route("/revoke", post(revoke))
        .with_state(state)
}

#[derive(Deserialize)]
struct LoginRequest {
    email: String,
    password: String,
}

/// Public view of a user. Never carries the password hash.
#[derive(Serialize)]
pub struct UserResponse {
    pub id: String,
    pub email: String,
    #[serde(rename = "createdAt")]
    pub created_at: String,
    #[serde(rename = "updatedAt")]
    pub updated_at: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[derive(Serialize)]
struct LoginResponse {
    user: UserResponse,
    token: String,
    #[serde(rename = "refreshToken")]
    refresh_token: String,
}

/// Log in with email and password.
///
/// Unknown email and wrong password produce the same response, so the
/// endpoint leaks no account-existence signal. The refresh token is
/// persisted before the response is sent.
async fn login(
    State(state): State<AuthState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if req.email.is_empty() || req.password.is_empty() {
        return Err(ApiError::bad_request("Email and password are required"));
    }

    let user = state
        .db
        .users()
        .get_by_email(&req.email)
        .await
        .db_err("Failed to look up user")?
        .ok_or_else(|| ApiError::unauthorized("Incorrect email or password"))?;

    if !verify_password(&req.password, &user.password) {
        return Err(ApiError::unauthorized("Incorrect email or password"));
    }

    let token = state.jwt.issue(&user.id, LOGIN_ACCESS_TTL_MS).map_err(|e| {
        error!("Failed to issue access token: {}", e);
        ApiError::internal("Failed to issue token")
    })?;

    let refresh_token = make_refresh_token();
    let now = unix_now_secs() as i64;
    let expires_at = now + (REFRESH_TOKEN_TTL_MS / 1000) as i64;

    state
        .db
        .refresh_tokens()
        .create(&refresh_token, &user.id, now, expires_at)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                ApiError::conflict("Refresh token collision")
            }
            _ => ApiError::db_error("Failed to store refresh token", e),
        })?;

    Ok((
        StatusCode::OK,
        Json(LoginResponse {
            user: user.into(),
            token,
            refresh_token,
        }),
    ))
}

#[derive(Serialize)]
struct RefreshResponse {
    token: String,
}

/// Mint a new short-lived access token from an active refresh token.
///
/// Missing, revoked and expired tokens all produce the same 401.
async fn refresh(
    State(state): State<AuthState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let refresh_token = get_bearer_token(&headers)?;

    let now = unix_now_secs() as i64;
    let user_id = state
        .db
        .refresh_tokens()
        .lookup_active_user(&refresh_token, now)
        .await
        .db_err("Failed to look up refresh token")?
        .ok_or_else(|| {
            debug!("Refresh rejected");
            ApiError::unauthorized("Invalid or expired refresh token")
        })?;

    let token = state
        .jwt
        .issue(&user_id, REFRESH_ACCESS_TTL_MS)
        .map_err(|e| {
            error!("Failed to issue access token: {}", e);
            ApiError::internal("Failed to issue token")
        })?;

    Ok((StatusCode::OK, Json(RefreshResponse { token })))
}

/// Revoke a refresh token. Succeeds with 204 even if the token was already
/// revoked, expired or never existed; only a missing or malformed
/// Authorization header fails.
async fn revoke(
    State(state): State<AuthState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let refresh_token = get_bearer_token(&headers)?;

    let now = unix_now_secs() as i64;
    state
        .db
        .refresh_tokens()
        .revoke(&refresh_token, now)
        .await
        .db_err("Failed to revoke refresh token")?;

    Ok(StatusCode::NO_CONTENT)
}
