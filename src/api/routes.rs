//! API route definitions
//!
//! Organizes endpoints for the recognition server:
//! - /health - liveness and uptime
//! - /api/v1/status - session and throughput counters
//! - /handsup/ws/translate - the streaming translation endpoint

use axum::routing::get;
use axum::Router;

use super::handlers::{self, ApiState};
use super::ws;

/// Create the REST API routes.
pub fn api_routes(state: ApiState) -> Router {
    Router::new()
        .route("/status", get(handlers::get_status))
        .with_state(state)
}

/// Root-level health endpoint.
pub fn legacy_routes(state: ApiState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .with_state(state)
}

/// The streaming translation endpoint.
pub fn ws_routes(state: ApiState) -> Router {
    Router::new()
        .route("/handsup/ws/translate", get(ws::ws_handler))
        .with_state(state)
}
