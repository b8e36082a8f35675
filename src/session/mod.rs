//! Streaming Session Module
//!
//! Everything one WebSocket connection owns:
//!
//! - `buffer` - bounded frame buffer with gap interpolation
//! - `cooldown` - post-result suppression window
//! - `error` - session-local error taxonomy
//! - `state_machine` - the per-connection controller
//!
//! Sessions are independent units of execution: no shared mutable state
//! crosses session boundaries, and the classifier registry they all read is
//! immutable after startup.

pub mod buffer;
pub mod cooldown;
pub mod error;
pub mod state_machine;

pub use buffer::{interpolate_gaps, SequenceBuffer};
pub use cooldown::CooldownController;
pub use error::SessionError;
pub use state_machine::{SessionState, SessionStateMachine};
