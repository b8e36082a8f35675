//! SignStream: Real-Time Sign Language Recognition
//!
//! Streaming session engine for landmark-based sign classification.
//!
//! ## Architecture
//!
//! - **SessionStateMachine**: per-connection protocol and decision driver
//! - **Arbiter**: classifier selection and disagreement reconciliation
//! - **SequenceBuffer**: bounded frame buffer with gap interpolation
//! - **CooldownController**: post-result re-trigger suppression
//! - **ModelRegistry**: shared read-only classifier handles

pub mod api;
pub mod arbiter;
pub mod classify;
pub mod config;
pub mod extract;
pub mod session;
pub mod state;
pub mod types;

// Re-export configuration
pub use config::AppConfig;

// Re-export commonly used types
pub use types::{
    ClassificationResult, ControlMessage, Dexterity, LandmarkFrame, ModelMode, ResultKind,
    ServerMessage, SessionStatus, SignResult,
};

// Re-export the session engine
pub use arbiter::{Arbiter, Verdict};
pub use session::{
    CooldownController, SequenceBuffer, SessionError, SessionState, SessionStateMachine,
};

// Re-export the classifier boundary
pub use classify::{ClassifierError, ClassifierPort, ModelRegistry, Prediction};

// Re-export server state
pub use state::{AppState, SystemStatus};
