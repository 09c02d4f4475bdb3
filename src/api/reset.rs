//! Development-only database reset.

use axum::{Json, Router, extract::State, http::StatusCode, response::IntoResponse, routing::post};

use super::error::{ApiError, ResultExt};
use crate::Platform;
use crate::db::Database;

#[derive(Clone)]
pub struct ResetState {
    pub db: Database,
    pub platform: Platform,
}

pub fn router(state: ResetState) -> Router {
    Router::new().route("/", post(reset)).with_state(state)
}

async fn reset(State(state): State<ResetState>) -> Result<impl IntoResponse, ApiError> {
    if state.platform != Platform::Dev {
        return Err(ApiError::forbidden(
            "Reset is only allowed in dev environment",
        ));
    }

    state.db.reset().await.db_err("Failed to reset database")?;

    Ok((
        StatusCode::OK,
        Json(serde_json::json!({ "message": "Database reset to initial state" })),
    ))
}
