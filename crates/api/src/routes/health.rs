use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    /// Configured handler timeout, `null` when unbounded.
    job_timeout_secs: Option<u64>,
}

async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        job_timeout_secs: state.config.job_timeout().map(|t| t.as_secs()),
    })
}

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
