//! Tests for `AppError` and invocation outcome → HTTP response mapping.
//!
//! These tests verify that each failure produces the correct HTTP status
//! code, error code, and message. They do NOT need an HTTP server -- they
//! call `IntoResponse` / `outcome_response` directly.

use std::time::Duration;

use axum::http::StatusCode;
use axum::response::IntoResponse;
use http_body_util::BodyExt;
use jobhook_api::error::{panic_response, AppError};
use jobhook_api::response::{aborted_response, outcome_response, TimeoutResponse};
use jobhook_core::error::{BindingError, DispatchError};

/// Helper: convert an `AppError` into its status code and parsed JSON body.
async fn error_to_response(err: AppError) -> (StatusCode, serde_json::Value) {
    let response = err.into_response();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    (status, json)
}

// ---------------------------------------------------------------------------
// Test: binding failure maps to sanitized 500
// ---------------------------------------------------------------------------

#[tokio::test]
async fn binding_error_returns_500() {
    let err = AppError::Dispatch(DispatchError::Binding(BindingError::Unresolved {
        type_name: "app::Database",
    }));

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["code"], "INTERNAL_ERROR");
    assert_eq!(json["error"], "An internal error occurred");
}

// ---------------------------------------------------------------------------
// Test: handler fault is indistinguishable from binding failure
// ---------------------------------------------------------------------------

#[tokio::test]
async fn handler_fault_matches_binding_error_response() {
    let binding = AppError::Dispatch(DispatchError::Binding(BindingError::MissingArgument {
        position: 0,
    }));
    let fault = AppError::Dispatch(DispatchError::HandlerFault(anyhow::anyhow!(
        "secret connection string in message"
    )));

    let binding = error_to_response(binding).await;
    let fault = error_to_response(fault).await;

    assert_eq!(binding, fault);
}

// ---------------------------------------------------------------------------
// Test: AppError::BadRequest maps to 400 with BAD_REQUEST code
// ---------------------------------------------------------------------------

#[tokio::test]
async fn bad_request_error_returns_400() {
    let err = AppError::BadRequest("Job name must not be empty".into());

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "BAD_REQUEST");
    assert_eq!(json["error"], "Job name must not be empty");
}

// ---------------------------------------------------------------------------
// Test: escaped panics map to the sanitized 500 JSON envelope
// ---------------------------------------------------------------------------

#[tokio::test]
async fn panic_response_returns_500_json_and_hides_message() {
    let response = panic_response(Box::new(String::from("index out of bounds")));

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(json["code"], "INTERNAL_ERROR");
    assert_eq!(json["error"], "An internal error occurred");
}

#[tokio::test]
async fn panic_response_accepts_static_str_payload() {
    let response = panic_response(Box::new("bad state"));

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

// ---------------------------------------------------------------------------
// Test: timeout outcome honours the configured response style
// ---------------------------------------------------------------------------

#[tokio::test]
async fn timeout_outcome_with_status_style_is_504_json() {
    let outcome = Err(DispatchError::Timeout {
        timeout: Duration::from_secs(1),
    });

    let response = outcome_response(outcome, TimeoutResponse::Status);

    assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(json["code"], "TIMEOUT");
}

#[tokio::test]
async fn timeout_outcome_with_abort_style_fails_body() {
    let outcome = Err(DispatchError::Timeout {
        timeout: Duration::from_secs(1),
    });

    let response = outcome_response(outcome, TimeoutResponse::Abort);

    assert!(response.into_body().collect().await.is_err());
}

#[tokio::test]
async fn aborted_response_body_errors_immediately() {
    let response = aborted_response();

    assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
    assert!(response.into_body().collect().await.is_err());
}
