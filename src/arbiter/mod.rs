//! Arbiter - classifier selection and disagreement reconciliation
//!
//! The arbiter owns the decision logic between the session's buffer and the
//! model registry. Per mode:
//!
//! ## Alpha / Numeric - two escalating tiers
//!
//! 1. *Early two-frame confirmation*: at exactly 2 buffered frames the
//!    static alphabet model runs on each frame independently. An identical
//!    top label on both frames, outside the reserved dynamic-gesture set,
//!    confirms immediately - a latency optimization, not a correctness
//!    requirement. Confidence is the `min` of the two agreeing frames.
//! 2. *Full ten-frame window*: the dynamic two-state model runs on the
//!    interpolated window and the static model on the final frame. The
//!    dynamic label wins when the static model agrees with it; otherwise
//!    the static label wins - the dynamic model is prone to false
//!    positives on held-still hands, so static is the authoritative
//!    tie-breaker.
//!
//! The numeric model runs alongside on every invocation that reaches the
//! static classifier; letter and number slots travel together because the
//! two alphabets are not mutually exclusive at the protocol level.
//!
//! ## Glosses - single tier
//!
//! One call to the word-sequence model on the full interpolated window. No
//! early exit.
//!
//! Any result under its classifier's confidence threshold is reported as
//! "no sign" with the raw confidence preserved.

use std::sync::Arc;

use tracing::{debug, info};

use crate::classify::{ClassifierError, ClassifierPort, ModelRegistry, Prediction};
use crate::config::{SessionConfig, ThresholdConfig};
use crate::session::buffer::interpolate_gaps;
use crate::session::error::SessionError;
use crate::types::{ClassificationResult, LandmarkFrame, ModelMode, ResultKind, SignResult};

/// Outcome of one arbiter invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    /// A final decision for this window (possibly "no sign").
    Emit(SignResult),
    /// The early tier declined; keep collecting toward the full window.
    Continue,
}

/// Per-session decision engine over the shared model registry.
pub struct Arbiter {
    registry: Arc<ModelRegistry>,
    session: SessionConfig,
    thresholds: ThresholdConfig,
    /// Per-session floor from a `config` control message; overrides every
    /// per-classifier threshold when set.
    min_confidence_override: Option<f32>,
}

impl Arbiter {
    pub fn new(
        registry: Arc<ModelRegistry>,
        session: SessionConfig,
        thresholds: ThresholdConfig,
    ) -> Self {
        Self {
            registry,
            session,
            thresholds,
            min_confidence_override: None,
        }
    }

    /// Apply a per-session confidence floor (from the `config` message).
    pub fn set_min_confidence(&mut self, floor: Option<f32>) {
        self.min_confidence_override = floor;
    }

    /// Decide on a captured window.
    ///
    /// `forced` marks an explicit `process` or a stop-drain pass: the early
    /// tier may not answer `Continue` and short alpha windows fall back to
    /// static-only classification.
    pub async fn decide(
        &self,
        window: &[LandmarkFrame],
        mode: ModelMode,
        forced: bool,
    ) -> Result<Verdict, SessionError> {
        match mode {
            ModelMode::Alpha | ModelMode::Numeric => {
                self.decide_alpha_numeric(window, forced).await
            }
            ModelMode::Glosses => self.decide_word(window).await,
        }
    }

    // ========================================================================
    // Alpha / Numeric tiers
    // ========================================================================

    async fn decide_alpha_numeric(
        &self,
        window: &[LandmarkFrame],
        forced: bool,
    ) -> Result<Verdict, SessionError> {
        debug_assert!(window.len() >= 2, "caller validates minimum frame count");

        if window.len() == self.session.early_window {
            if let Some(result) = self.early_confirm(window).await? {
                return Ok(Verdict::Emit(result));
            }
            if !forced {
                return Ok(Verdict::Continue);
            }
            // Forced with only the early window buffered: the client says
            // the gesture is complete, so answer from the static models.
            let result = self.static_only(window).await?;
            return Ok(Verdict::Emit(result));
        }

        if window.len() < self.session.dynamic_window {
            // Reachable only on forced passes between the two tiers.
            let result = self.static_only(window).await?;
            return Ok(Verdict::Emit(result));
        }

        let result = self.full_dynamic_window(window).await?;
        Ok(Verdict::Emit(result))
    }

    /// Tier 1: confirm a static sign from two agreeing frames.
    ///
    /// Both frames must be present - a dropped detection simply fails to
    /// fire the tier and collection continues toward the full window.
    async fn early_confirm(
        &self,
        window: &[LandmarkFrame],
    ) -> Result<Option<SignResult>, SessionError> {
        let (first, second) = (&window[0], &window[1]);
        if !first.present || !second.present {
            debug!("Early tier skipped: dropped detection in confirmation pair");
            return Ok(None);
        }

        let alpha = &self.registry.static_alpha;
        let p1 = self.call(alpha, &[first.coords.clone()]).await?;
        let p2 = self.call(alpha, &[second.coords.clone()]).await?;

        if p1.label != p2.label {
            debug!(first = %p1.label, second = %p2.label, "Early tier: labels disagree");
            return Ok(None);
        }
        if self.session.is_dynamic_label(&p1.label) {
            debug!(label = %p1.label, "Early tier: dynamic-gesture label, collecting full window");
            return Ok(None);
        }

        // Conservative rule: the weaker of the two agreeing confidences.
        let confidence = p1.confidence.min(p2.confidence);
        let letter = self.gate(
            Prediction {
                label: p2.label,
                confidence,
            },
            self.thresholds.static_alpha,
            ResultKind::Letter,
        );
        let number = self.classify_number(second).await?;

        info!(
            letter = %letter.label,
            confidence = letter.confidence,
            "Early two-frame confirmation fired"
        );

        Ok(Some(SignResult::AlphaNumeric { letter, number }))
    }

    /// Tier 2: dynamic model over the interpolated window, reconciled
    /// against the static model on the final frame.
    async fn full_dynamic_window(
        &self,
        window: &[LandmarkFrame],
    ) -> Result<SignResult, SessionError> {
        let filled = interpolate_gaps(window)?;
        let span = &filled[..self.session.dynamic_window.min(filled.len())];
        let tensor: Vec<Vec<f32>> = span.iter().map(|f| f.coords.clone()).collect();

        let dynamic = self.call(&self.registry.dynamic_gesture, &tensor).await?;

        let last = &filled[filled.len() - 1];
        let static_pred = self
            .call(&self.registry.static_alpha, &[last.coords.clone()])
            .await?;

        // The dynamic model only wins with corroboration from the static
        // model on the final frame; otherwise static is authoritative.
        let letter = if dynamic.label == static_pred.label {
            self.gate(dynamic.clone(), self.thresholds.dynamic_gesture, ResultKind::Gesture)
        } else {
            let kind = if self.session.is_dynamic_label(&static_pred.label) {
                ResultKind::Gesture
            } else {
                ResultKind::Letter
            };
            self.gate(static_pred.clone(), self.thresholds.static_alpha, kind)
        };

        let number = self.classify_number(last).await?;

        info!(
            dynamic_label = %dynamic.label,
            static_label = %static_pred.label,
            chosen = %letter.label,
            "Full-window reconciliation complete"
        );

        Ok(SignResult::AlphaNumeric { letter, number })
    }

    /// Forced short window: answer from the static models on the last
    /// detected frame.
    async fn static_only(&self, window: &[LandmarkFrame]) -> Result<SignResult, SessionError> {
        let Some(last) = window.iter().rev().find(|f| f.present) else {
            return Err(SessionError::UndecidableSequence);
        };

        let alpha = self
            .call(&self.registry.static_alpha, &[last.coords.clone()])
            .await?;
        let kind = if self.session.is_dynamic_label(&alpha.label) {
            ResultKind::Gesture
        } else {
            ResultKind::Letter
        };
        let letter = self.gate(alpha, self.thresholds.static_alpha, kind);
        let number = self.classify_number(last).await?;

        Ok(SignResult::AlphaNumeric { letter, number })
    }

    /// Run the numeric model on one frame and gate the result.
    async fn classify_number(
        &self,
        frame: &LandmarkFrame,
    ) -> Result<ClassificationResult, SessionError> {
        if !frame.present {
            return Ok(ClassificationResult::none(ResultKind::Number));
        }
        let pred = self
            .call(&self.registry.static_numeric, &[frame.coords.clone()])
            .await?;
        Ok(self.gate(pred, self.thresholds.static_numeric, ResultKind::Number))
    }

    // ========================================================================
    // Glosses
    // ========================================================================

    async fn decide_word(&self, window: &[LandmarkFrame]) -> Result<Verdict, SessionError> {
        let filled = interpolate_gaps(window)?;
        let tensor: Vec<Vec<f32>> = filled.iter().map(|f| f.coords.clone()).collect();

        let pred = self.call(&self.registry.word_sequence, &tensor).await?;
        let word = self.gate(pred, self.thresholds.word_sequence, ResultKind::Word);

        info!(
            word = %word.label,
            confidence = word.confidence,
            frames = tensor.len(),
            "Word-sequence decision complete"
        );

        Ok(Verdict::Emit(SignResult::Word(word)))
    }

    // ========================================================================
    // Shared plumbing
    // ========================================================================

    async fn call(
        &self,
        port: &Arc<dyn ClassifierPort>,
        window: &[Vec<f32>],
    ) -> Result<Prediction, SessionError> {
        port.classify(window).await.map_err(|e| match e {
            ClassifierError::Unavailable(reason) => SessionError::ClassifierUnavailable {
                name: port.name().to_string(),
                reason,
            },
            ClassifierError::ShapeMismatch { expected, actual } => {
                SessionError::ClassifierUnavailable {
                    name: port.name().to_string(),
                    reason: format!("shape mismatch: expected {expected}, got {actual}"),
                }
            }
        })
    }

    /// Apply the classifier's threshold (or the session override) and blank
    /// the label when confidence falls short, preserving the raw confidence.
    fn gate(&self, pred: Prediction, threshold: f32, kind: ResultKind) -> ClassificationResult {
        let floor = self.min_confidence_override.unwrap_or(threshold);
        let result = ClassificationResult::new(pred.label, pred.confidence, kind);
        if result.confidence < floor {
            debug!(
                label = %result.label,
                confidence = result.confidence,
                floor,
                "Result gated below confidence floor"
            );
            result.gated()
        } else {
            result
        }
    }
}
