//! Classifier ports and the shared model registry
//!
//! A [`ClassifierPort`] abstracts one external trained model: given a window
//! of landmark vectors in the shape it expects, it returns a label and a
//! confidence, or an explicit "unavailable" outcome. The four roles the
//! decision engine consumes are collected in a [`ModelRegistry`] — a
//! process-wide, read-only set of handles built once at startup and shared
//! by every session. Sessions never mutate it; concurrent inference calls
//! from multiple sessions are safe.

pub mod http;
pub mod stub;

pub use http::HttpClassifier;
pub use stub::ScriptedClassifier;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::InferenceConfig;

/// A raw model outcome before confidence gating.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub label: String,
    pub confidence: f32,
}

/// Failures at the model boundary.
#[derive(Debug, Clone, Error)]
pub enum ClassifierError {
    /// The backend could not be reached or refused the call.
    #[error("backend unavailable: {0}")]
    Unavailable(String),

    /// The window does not match the shape this model was trained on.
    #[error("input shape mismatch: expected {expected} coords per frame, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },
}

/// Abstraction over one external trained model.
#[async_trait]
pub trait ClassifierPort: Send + Sync {
    /// Short name used in logs and error messages.
    fn name(&self) -> &str;

    /// Classify a window of landmark vectors (one inner vec per frame).
    async fn classify(&self, window: &[Vec<f32>]) -> Result<Prediction, ClassifierError>;
}

/// Process-wide, read-only registry of the four classifier roles.
///
/// Built once at startup and injected into each session's arbiter.
#[derive(Clone)]
pub struct ModelRegistry {
    /// Static single-hand alphabet model (single-frame input).
    pub static_alpha: Arc<dyn ClassifierPort>,
    /// Static numeric model (single-frame input).
    pub static_numeric: Arc<dyn ClassifierPort>,
    /// Dynamic two-state model for the traced letters (multi-frame window).
    pub dynamic_gesture: Arc<dyn ClassifierPort>,
    /// Whole-body word-sequence model (fixed-length window, padded
    /// server-side for shorter drains).
    pub word_sequence: Arc<dyn ClassifierPort>,
}

impl ModelRegistry {
    /// Registry backed by a remote HTTP model server.
    pub fn http(config: &InferenceConfig) -> anyhow::Result<Self> {
        let client = http::build_client(config)?;
        Ok(Self {
            static_alpha: Arc::new(HttpClassifier::new(
                client.clone(),
                &config.base_url,
                "static-alpha",
            )),
            static_numeric: Arc::new(HttpClassifier::new(
                client.clone(),
                &config.base_url,
                "static-numeric",
            )),
            dynamic_gesture: Arc::new(HttpClassifier::new(
                client.clone(),
                &config.base_url,
                "dynamic-gesture",
            )),
            word_sequence: Arc::new(HttpClassifier::new(
                client,
                &config.base_url,
                "word-sequence",
            )),
        })
    }
}
