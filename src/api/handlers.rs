//! API route handlers
//!
//! Request handling logic for the REST surface: liveness and server-wide
//! session counters. The streaming endpoint lives in `api::ws`.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Serialize;
use tokio::sync::RwLock;

use crate::classify::ModelRegistry;
use crate::extract::LandmarkExtractor;
use crate::state::AppState;

// ============================================================================
// API State
// ============================================================================

/// Shared state for API handlers and the WebSocket endpoint.
#[derive(Clone)]
pub struct ApiState {
    /// Server-wide counters
    pub app_state: Arc<RwLock<AppState>>,
    /// Read-only classifier handles shared by every session
    pub registry: Arc<ModelRegistry>,
    /// Frame payload decoder for the configured wire format
    pub extractor: Arc<dyn LandmarkExtractor>,
}

impl ApiState {
    pub fn new(
        app_state: Arc<RwLock<AppState>>,
        registry: Arc<ModelRegistry>,
        extractor: Arc<dyn LandmarkExtractor>,
    ) -> Self {
        Self {
            app_state,
            registry,
            extractor,
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// Liveness response for `/health`.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub uptime_seconds: u64,
    pub timestamp: String,
}

/// Simple liveness check.
pub async fn health_check(State(state): State<ApiState>) -> Json<HealthResponse> {
    let app = state.app_state.read().await;
    Json(HealthResponse {
        status: app.status.to_string(),
        uptime_seconds: app.uptime_secs(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

/// Server counters for `/api/v1/status`.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: String,
    pub uptime_seconds: u64,
    pub sessions_opened: u64,
    pub sessions_active: u64,
    pub frames_received: u64,
    pub results_emitted: u64,
    pub errors_reported: u64,
    pub last_result_time: Option<String>,
}

/// Session and throughput counters.
pub async fn get_status(State(state): State<ApiState>) -> Json<StatusResponse> {
    let app = state.app_state.read().await;
    Json(StatusResponse {
        status: app.status.to_string(),
        uptime_seconds: app.uptime_secs(),
        sessions_opened: app.sessions_opened,
        sessions_active: app.sessions_active,
        frames_received: app.frames_received,
        results_emitted: app.results_emitted,
        errors_reported: app.errors_reported,
        last_result_time: app.last_result_time.map(|t| t.to_rfc3339()),
    })
}
