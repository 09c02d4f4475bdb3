mod auth;
mod error;
mod reset;
mod thumbnails;
mod users;
mod videos;

use axum::Router;
use std::sync::Arc;

use crate::Platform;
use crate::db::Database;
use crate::jwt::JwtConfig;

pub use error::ApiError;

/// Create the API router.
pub fn create_api_router(db: Database, jwt: Arc<JwtConfig>, platform: Platform) -> Router {
    let auth_state = auth::AuthState {
        db: db.clone(),
        jwt: jwt.clone(),
    };

    let users_state = users::UsersState { db: db.clone() };

    let videos_state = videos::VideosState {
        db: db.clone(),
        jwt: jwt.clone(),
    };

    let thumbnails_state = thumbnails::ThumbnailsState {
        db: db.clone(),
        jwt,
    };

    let reset_state = reset::ResetState { db, platform };

    Router::new()
        .merge(auth::router(auth_state))
        .nest("/users", users::router(users_state))
        .nest("/videos", videos::router(videos_state))
        .nest("/thumbnails", thumbnails::router(thumbnails_state))
        .nest("/reset", reset::router(reset_state))
}
