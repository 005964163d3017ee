//! Axum route handlers for the worker web port.
//!
//! # Routes
//!
//! - `GET /health`             — `{"status": "ok"|"starting", ...}`; 503 until ready
//! - `GET /api/v1/worker/info` — Worker address, RPC address, start time, uptime, state

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use tower_http::trace::TraceLayer;

use crate::worker::default_worker::WorkerStatus;

/// Shared state for the web handlers.
#[derive(Clone)]
pub struct AppState {
    pub status: Arc<WorkerStatus>,
}

impl AppState {
    pub fn new(status: Arc<WorkerStatus>) -> Self {
        Self { status }
    }
}

/// Build the axum router with all routes.
pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/v1/worker/info", get(info_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// GET /health — 200 once the worker is ready, 503 before.
async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    let ready = state.status.readiness().is_ready();
    let code = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (
        code,
        Json(serde_json::json!({
            "status": if ready { "ok" } else { "starting" },
            "version": crate::VERSION,
            "service": "storage-worker",
        })),
    )
}

/// GET /api/v1/worker/info
async fn info_handler(State(state): State<AppState>) -> impl IntoResponse {
    let status = &state.status;
    Json(serde_json::json!({
        "address": status.address,
        "rpc_address": status.rpc_address.to_string(),
        "start_time_ms": status.start_time_ms,
        "uptime_ms": status.uptime_ms(),
        "state": status.state(),
        "ready": status.readiness().is_ready(),
    }))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
