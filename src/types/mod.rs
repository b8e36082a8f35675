//! Core domain and protocol types
//!
//! Organized by concern:
//! - `landmark` - frames, model modes, dexterity
//! - `result` - classification outcomes
//! - `protocol` - WebSocket wire messages

pub mod landmark;
pub mod protocol;
pub mod result;

pub use landmark::{Dexterity, LandmarkFrame, ModelMode, HAND_FRAME_DIM, HOLISTIC_FRAME_DIM};
pub use protocol::{parse_control, ControlMessage, ServerMessage, SessionStatus};
pub use result::{ClassificationResult, ResultKind, SignResult};
