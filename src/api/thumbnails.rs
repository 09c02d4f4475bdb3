//! Thumbnail upload.
//!
//! The thumbnail is stored inline on the video row as a base64 data URL, so
//! serving it needs no separate asset store. Only the owning user may
//! replace a video's thumbnail.

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::post,
};
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use std::sync::Arc;
use tracing::info;

use super::error::{ApiError, ResultExt, validate_uuid};
use crate::auth::{Auth, HasAuthState, authorize_owner};
use crate::db::Database;
use crate::jwt::JwtConfig;

/// Maximum thumbnail size: 10 MB
const MAX_UPLOAD_SIZE: usize = 10 << 20;

#[derive(Clone)]
pub struct ThumbnailsState {
    pub db: Database,
    pub jwt: Arc<JwtConfig>,
}

impl HasAuthState for ThumbnailsState {
    fn jwt(&self) -> &JwtConfig {
        &self.jwt
    }
}

pub fn router(state: ThumbnailsState) -> Router {
    Router::new()
        .route("/{videoId}", post(upload_thumbnail))
        // Multipart framing overhead on top of the thumbnail cap
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_SIZE + 1024 * 1024))
        .with_state(state)
}

async fn upload_thumbnail(
    State(state): State<ThumbnailsState>,
    Auth(user_id): Auth,
    Path(video_id): Path<String>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    validate_uuid(&video_id)?;

    info!(video = %video_id, user = %user_id, "Uploading thumbnail");

    let mut thumbnail: Option<(String, Vec<u8>)> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| ApiError::bad_request("Invalid multipart body"))?
    {
        if field.name() == Some("thumbnail") {
            let media_type = field
                .content_type()
                .unwrap_or("image/jpeg")
                .to_string();
            let data = field
                .bytes()
                .await
                .map_err(|_| ApiError::bad_request("Failed to read thumbnail"))?;
            thumbnail = Some((media_type, data.to_vec()));
        }
    }

    let (media_type, data) =
        thumbnail.ok_or_else(|| ApiError::bad_request("Thumbnail file missing"))?;

    if data.len() > MAX_UPLOAD_SIZE {
        return Err(ApiError::bad_request("File too large (max 10MB)"));
    }

    let video = state
        .db
        .videos()
        .get(&video_id)
        .await
        .db_err("Failed to get video")?
        .ok_or_else(|| ApiError::not_found("Couldn't find video"))?;

    authorize_owner(&user_id, &video.user_id)
        .map_err(|_| ApiError::forbidden("You don't own this video"))?;

    let data_url = format!("data:{};base64,{}", media_type, BASE64.encode(&data));
    state
        .db
        .videos()
        .update_thumbnail(&video_id, &data_url)
        .await
        .db_err("Failed to update thumbnail")?;

    let updated = state
        .db
        .videos()
        .get(&video_id)
        .await
        .db_err("Failed to load updated video")?
        .ok_or_else(|| ApiError::internal("Updated video not found"))?;

    Ok((StatusCode::OK, Json(updated)))
}
