use std::any::Any;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use jobhook_core::error::DispatchError;
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`DispatchError`] for trigger failures and adds HTTP-specific
/// variants. Implements [`IntoResponse`] to produce consistent JSON error
/// responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A failed job trigger invocation from `jobhook_core`.
    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // --- Dispatch failures ---
            // Binding and handler faults deliberately share one response;
            // only the logs tell them apart.
            AppError::Dispatch(err @ (DispatchError::Binding(_) | DispatchError::HandlerFault(_))) => {
                tracing::error!(kind = err.kind(), error = %err, "Job trigger dispatch failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            }
            AppError::Dispatch(DispatchError::Timeout { timeout }) => (
                StatusCode::GATEWAY_TIMEOUT,
                "TIMEOUT",
                format!("Job handler did not complete within {}ms", timeout.as_millis()),
            ),

            // --- HTTP-specific errors ---
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

/// Response for a panic that escaped a route, used by `CatchPanicLayer`.
///
/// Same envelope as a dispatch failure; the panic message is only logged.
pub fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s
    } else {
        "non-string panic payload"
    };
    tracing::error!(panic = %detail, "Request handler panicked");

    let body = json!({
        "error": "An internal error occurred",
        "code": "INTERNAL_ERROR",
    });

    (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(body)).into_response()
}
