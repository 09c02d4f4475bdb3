//! User registration.

use axum::{Json, Router, extract::State, http::StatusCode, response::IntoResponse, routing::post};
use serde::Deserialize;
use tracing::error;
use uuid::Uuid;

use super::auth::UserResponse;
use super::error::{ApiError, ResultExt};
use crate::db::Database;
use crate::password::hash_password;

#[derive(Clone)]
pub struct UsersState {
    pub db: Database,
}

pub fn router(state: UsersState) -> Router {
    Router::new().route("/", post(create_user)).with_state(state)
}

#[derive(Deserialize)]
struct CreateUserRequest {
    email: String,
    password: String,
}

/// Register a new user. The password is hashed before it touches the
/// database; the response never includes the hash.
async fn create_user(
    State(state): State<UsersState>,
    Json(req): Json<CreateUserRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if req.email.is_empty() || req.password.is_empty() {
        return Err(ApiError::bad_request("Email and password are required"));
    }

    let hashed = hash_password(&req.password).map_err(|e| {
        error!("Failed to hash password: {}", e);
        ApiError::internal("Failed to hash password")
    })?;

    let id = Uuid::new_v4().to_string();
    state
        .db
        .users()
        .create(&id, &req.email, &hashed)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                ApiError::conflict("Email already registered")
            }
            _ => ApiError::db_error("Failed to create user", e),
        })?;

    let user = state
        .db
        .users()
        .get_by_id(&id)
        .await
        .db_err("Failed to load created user")?
        .ok_or_else(|| ApiError::internal("Created user not found"))?;

    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}
