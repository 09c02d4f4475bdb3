#![allow(dead_code)]

use axum::{
    Router,
    body::Body,
    http::{Request, Response, StatusCode},
};
use tower::ServiceExt;
use tubed::{Platform, ServerConfig, create_app, db::Database};

pub const TEST_JWT_SECRET: &[u8] = b"test-jwt-secret";

pub async fn create_test_app() -> Router {
    let db = Database::open(":memory:")
        .await
        .expect("Failed to open test database");
    let config = ServerConfig {
        db,
        jwt_secret: TEST_JWT_SECRET.to_vec(),
        platform: Platform::Dev,
    };
    create_app(&config)
}

/// POST a JSON body to the app.
pub async fn post_json(
    app: &Router,
    uri: &str,
    json: serde_json::Value,
) -> Response<axum::body::Body> {
    app.clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
        )
        .await
        .unwrap()
}

/// POST with a bearer token and no body.
pub async fn post_bearer(app: &Router, uri: &str, token: &str) -> Response<axum::body::Body> {
    app.clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("Authorization", format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap()
}

pub async fn body_json(response: Response<axum::body::Body>) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

/// Register a user and return the created user JSON.
pub async fn register(app: &Router, email: &str, password: &str) -> serde_json::Value {
    let response = post_json(
        app,
        "/api/users",
        serde_json::json!({ "email": email, "password": password }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await
}

/// Log in and return the `{user, token, refreshToken}` JSON.
pub async fn login(app: &Router, email: &str, password: &str) -> serde_json::Value {
    let response = post_json(
        app,
        "/api/login",
        serde_json::json!({ "email": email, "password": password }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await
}
