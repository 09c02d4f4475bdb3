//! Video draft endpoints.
//!
//! - POST `/` - Create a draft owned by the caller
//! - GET `/` - List the caller's videos
//! - GET `/{videoId}` - Fetch a single video
//! - DELETE `/{videoId}` - Delete an owned video
//!
//! Binary media upload is not handled here; drafts carry metadata and the
//! thumbnail data URL only.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use super::error::{ApiError, ResultExt, validate_uuid};
use crate::auth::{Auth, HasAuthState, authorize_owner};
use crate::db::Database;
use crate::jwt::JwtConfig;

#[derive(Clone)]
pub struct VideosState {
    pub db: Database,
    pub jwt: Arc<JwtConfig>,
}

impl HasAuthState for VideosState {
    fn jwt(&self) -> &JwtConfig {
        &self.jwt
    }
}

pub fn router(state: VideosState) -> Router {
    Router::new()
        .route("/", get(list_videos).post(create_video))
        .route("/{videoId}", get(get_video).delete(delete_video))
        .with_state(state)
}

#[derive(Deserialize)]
struct CreateVideoRequest {
    title: String,
    #[serde(default)]
    description: String,
}

async fn create_video(
    State(state): State<VideosState>,
    Auth(user_id): Auth,
    Json(req): Json<CreateVideoRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if req.title.is_empty() {
        return Err(ApiError::bad_request("Title is required"));
    }

    let id = Uuid::new_v4().to_string();
    state
        .db
        .videos()
        .create(&id, &req.title, &req.description, &user_id)
        .await
        .db_err("Failed to create video")?;

    let video = state
        .db
        .videos()
        .get(&id)
        .await
        .db_err("Failed to load created video")?
        .ok_or_else(|| ApiError::internal("Created video not found"))?;

    Ok((StatusCode::CREATED, Json(video)))
}

async fn list_videos(
    State(state): State<VideosState>,
    Auth(user_id): Auth,
) -> Result<impl IntoResponse, ApiError> {
    let videos = state
        .db
        .videos()
        .list_by_user(&user_id)
        .await
        .db_err("Failed to list videos")?;

    Ok((StatusCode::OK, Json(videos)))
}

async fn get_video(
    State(state): State<VideosState>,
    Auth(_user_id): Auth,
    Path(video_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    validate_uuid(&video_id)?;

    let video = state
        .db
        .videos()
        .get(&video_id)
        .await
        .db_err("Failed to get video")?
        .ok_or_else(|| ApiError::not_found("Couldn't find video"))?;

    Ok((StatusCode::OK, Json(video)))
}

async fn delete_video(
    State(state): State<VideosState>,
    Auth(user_id): Auth,
    Path(video_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    validate_uuid(&video_id)?;

    let video = state
        .db
        .videos()
        .get(&video_id)
        .await
        .db_err("Failed to get video")?
        .ok_or_else(|| ApiError::not_found("Couldn't find video"))?;

    authorize_owner(&user_id, &video.user_id)
        .map_err(|_| ApiError::forbidden("You don't own this video"))?;

    state
        .db
        .videos()
        .delete(&video_id)
        .await
        .db_err("Failed to delete video")?;

    Ok(StatusCode::NO_CONTENT)
}
