//! HTTP status surface served on the worker's web port.
//!
//! # Endpoints
//!
//! - `GET /health`              — Liveness/readiness probe
//! - `GET /api/v1/worker/info`  — Address, timing and lifecycle state

pub mod routes;

pub use routes::{app_router, AppState};
