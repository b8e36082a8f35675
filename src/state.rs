//! Application State and System Status
//!
//! Shared state for the recognition server, accessible from API handlers
//! and the per-connection session tasks.

use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Shared application state accessible from API handlers and session tasks.
///
/// This struct is wrapped in `Arc<RwLock<>>` for thread-safe access across
/// the async runtime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppState {
    /// System uptime (serializes as seconds)
    #[serde(skip, default = "Instant::now")]
    pub uptime: Instant,

    /// Total WebSocket sessions opened since startup
    pub sessions_opened: u64,

    /// Sessions currently connected
    pub sessions_active: u64,

    /// Total binary frame messages received across all sessions
    pub frames_received: u64,

    /// Non-empty results emitted across all sessions
    pub results_emitted: u64,

    /// Error messages sent to clients
    pub errors_reported: u64,

    /// Last result timestamp
    pub last_result_time: Option<chrono::DateTime<chrono::Utc>>,

    /// Current system status
    pub status: SystemStatus,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            uptime: Instant::now(),
            sessions_opened: 0,
            sessions_active: 0,
            frames_received: 0,
            results_emitted: 0,
            errors_reported: 0,
            last_result_time: None,
            status: SystemStatus::Initializing,
        }
    }
}

impl AppState {
    /// Get uptime in seconds
    pub fn uptime_secs(&self) -> u64 {
        self.uptime.elapsed().as_secs()
    }
}

/// System operational status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SystemStatus {
    /// System is starting up
    Initializing,
    /// Accepting connections, models reachable
    Serving,
    /// System error or degraded operation
    Error,
}

impl std::fmt::Display for SystemStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SystemStatus::Initializing => write!(f, "Initializing"),
            SystemStatus::Serving => write!(f, "Serving"),
            SystemStatus::Error => write!(f, "Error"),
        }
    }
}
