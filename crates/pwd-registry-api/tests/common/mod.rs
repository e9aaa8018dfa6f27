//! Shared test helpers for API integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::extract::DefaultBodyLimit;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use pwd_registry_core::clock::Clock;
use pwd_registry_event_store::in_memory_event_repository::InMemoryEventRepository;
use pwd_registry_id_wizard::capture::StillExporter;
use pwd_registry_test_support::FixedClock;
use tower::ServiceExt;

use pwd_registry_api::routes;
use pwd_registry_api::state::AppState;

/// Upload ceiling used by the test app.
pub const TEST_MAX_BODY_BYTES: usize = 64 * 1024;

/// Longest stored photo edge used by the test app.
pub const TEST_MAX_EDGE: u32 = 64;

/// Fixed timestamp used across all integration tests.
fn fixed_clock() -> Arc<dyn Clock> {
    Arc::new(FixedClock(
        chrono::TimeZone::with_ymd_and_hms(&chrono::Utc, 2026, 1, 15, 10, 0, 0).unwrap(),
    ))
}

/// Build the full app router over a shared repository. Uses the same route
/// structure as `main.rs`.
pub fn build_test_app(repository: Arc<InMemoryEventRepository>) -> Router {
    let app_state = AppState::new(
        fixed_clock(),
        repository,
        StillExporter::new(TEST_MAX_EDGE),
    );

    Router::new()
        .merge(routes::health::router())
        .nest("/api/v1/id-drafts", routes::id_drafts::router())
        .layer(DefaultBodyLimit::max(TEST_MAX_BODY_BYTES))
        .with_state(app_state)
}

/// Encode a solid-colour PNG of the given size.
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let image = image::RgbImage::from_pixel(width, height, image::Rgb([40, 90, 160]));
    let mut out = Vec::new();
    image::DynamicImage::ImageRgb8(image)
        .write_to(&mut std::io::Cursor::new(&mut out), image::ImageFormat::Png)
        .unwrap();
    out
}

/// Send a request and return the status and JSON body (`Null` when the
/// body is not JSON).
pub async fn send(
    app: Router,
    method: &str,
    uri: &str,
    content_type: &str,
    body: Body,
) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", content_type)
        .body(body)
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&body_bytes).unwrap_or(serde_json::Value::Null);

    (status, json)
}

/// Send a POST request with no body.
pub async fn post_empty(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    send(app, "POST", uri, "application/json", Body::empty()).await
}

/// Send a PATCH request with a JSON body.
pub async fn patch_json(
    app: Router,
    uri: &str,
    body: &serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let bytes = serde_json::to_vec(body).unwrap();
    send(app, "PATCH", uri, "application/json", Body::from(bytes)).await
}

/// Send a PUT request with a raw image body.
pub async fn put_image(app: Router, uri: &str, bytes: Vec<u8>) -> (StatusCode, serde_json::Value) {
    send(app, "PUT", uri, "image/png", Body::from(bytes)).await
}

/// Send a GET request.
pub async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    send(app, "GET", uri, "application/json", Body::empty()).await
}

/// Send a DELETE request.
pub async fn delete(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    send(app, "DELETE", uri, "application/json", Body::empty()).await
}
