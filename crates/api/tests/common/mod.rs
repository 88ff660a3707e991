#![allow(dead_code)]

use axum::body::{Body, Bytes};
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use jobhook_api::config::ServerConfig;
use jobhook_api::router::build_app_router;
use jobhook_api::state::AppState;
use jobhook_api::TriggerOptions;
use jobhook_core::handler::TriggerHandler;

/// Build a test `ServerConfig` with safe defaults.
///
/// Binds to loopback on an ephemeral port with no handler timeout.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        ..ServerConfig::default()
    }
}

/// Build the full application router with all middleware layers and the
/// given trigger handler.
///
/// This mirrors the router construction in `main.rs` so integration tests
/// exercise the same middleware stack (request ID, tracing, panic recovery)
/// that production uses.
pub fn build_test_app<H, T>(handler: H, options: TriggerOptions) -> Router
where
    H: TriggerHandler<T>,
    T: 'static,
{
    build_app_router(AppState::new(test_config()), handler, options)
}

/// POST raw bytes to `uri`.
pub async fn post_bytes(app: Router, uri: &str, body: impl Into<Body>) -> Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", "application/octet-stream")
        .body(body.into())
        .unwrap();

    app.oneshot(request).await.unwrap()
}

/// GET `uri`.
pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    app.oneshot(request).await.unwrap()
}

/// Collect the whole body, surfacing a body error instead of panicking.
pub async fn try_body_bytes(response: Response<Body>) -> Result<Bytes, axum::Error> {
    response.into_body().collect().await.map(|c| c.to_bytes())
}

/// Collect the body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = try_body_bytes(response).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
