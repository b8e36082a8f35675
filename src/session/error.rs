//! Session error taxonomy
//!
//! Every variant is session-local and recoverable: the connection stays open
//! and the client keeps streaming. Nothing here is fatal to the server.

use thiserror::Error;

use crate::types::ModelMode;

/// Errors surfaced to the client as `{"error": ...}` messages.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// Buffer length does not match any valid decision point for the mode.
    /// Reported, buffer cleared, session continues.
    #[error("invalid frame count for {mode} mode: got {actual}, need at least {required}")]
    InvalidFrameCount {
        mode: ModelMode,
        actual: usize,
        required: usize,
    },

    /// A binary frame could not be turned into a landmark frame. The frame
    /// is treated as "no detection" and interpolated; never fatal.
    #[error("frame decode failed: {0}")]
    DecodeFailure(String),

    /// The entire window holds no detections; classification is not
    /// attempted and no cooldown is armed.
    #[error("no landmarks detected in the captured window")]
    UndecidableSequence,

    /// An external model call failed. Error emitted, buffer cleared,
    /// session remains alive.
    #[error("classifier '{name}' unavailable: {reason}")]
    ClassifierUnavailable { name: String, reason: String },

    /// A control or frame message arrived while an inference call was in
    /// flight. Input dropped, no state change.
    #[error("processing in progress")]
    ConcurrentOperation,

    /// Frames or `process` arrived before a `start` message fixed the mode.
    #[error("session not started: send a start message first")]
    NotStarted,

    /// The `sequenceNum` in `start` is not a window length the word model
    /// was trained for.
    #[error("unsupported sequence length {0}")]
    UnsupportedSequenceLength(usize),
}
