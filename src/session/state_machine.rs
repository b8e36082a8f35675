//! Per-connection session state machine
//!
//! Owns everything one connection accumulates: the frame buffer, the
//! cooldown, the negotiated mode, and the arbiter handle. State is mutated
//! only inside this type's own event handlers - the transport loop feeds it
//! one event at a time and relays whatever messages come back, so a frame
//! and a control message can never interleave their mutations.
//!
//! ```text
//! Idle --start--> Collecting --threshold--> Processing --result--> Cooldown
//!                     ^                          |                    |
//!                     +---- empty result --------+<---- D frames ----+
//! any state --stop--> Stopped (after one drain pass over buffered frames)
//! ```
//!
//! The arbiter call is the single suspension point. Frames that arrive
//! while Processing or Cooldown are dropped, not queued - landmark streams
//! are high-rate and a stale frame is worthless once a decision is in
//! flight.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::arbiter::{Arbiter, Verdict};
use crate::classify::ModelRegistry;
use crate::config::{SessionConfig, ThresholdConfig};
use crate::extract::LandmarkExtractor;
use crate::session::buffer::SequenceBuffer;
use crate::session::cooldown::CooldownController;
use crate::session::error::SessionError;
use crate::types::{
    ControlMessage, Dexterity, ModelMode, ResultKind, ServerMessage, SessionStatus, SignResult,
};

/// Lifecycle state of one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Connection open, no mode negotiated yet.
    Idle,
    /// Accepting frames toward the next decision threshold.
    Collecting,
    /// An arbiter call is in flight.
    Processing,
    /// Suppressing re-triggers on the sign just reported.
    Cooldown,
    /// Session ended; no further input is accepted.
    Stopped,
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionState::Idle => write!(f, "Idle"),
            SessionState::Collecting => write!(f, "Collecting"),
            SessionState::Processing => write!(f, "Processing"),
            SessionState::Cooldown => write!(f, "Cooldown"),
            SessionState::Stopped => write!(f, "Stopped"),
        }
    }
}

/// Per-connection controller composing buffer, cooldown, and arbiter.
pub struct SessionStateMachine {
    state: SessionState,
    mode: Option<ModelMode>,
    buffer: SequenceBuffer,
    cooldown: CooldownController,
    arbiter: Arbiter,
    extractor: Arc<dyn LandmarkExtractor>,
    config: SessionConfig,
    dexterity: Dexterity,

    /// Frames accepted into the buffer.
    frames_ingested: u64,
    /// Frames dropped by backpressure (Processing or Cooldown).
    frames_discarded: u64,
    /// Non-empty results emitted.
    results_emitted: u64,
}

impl SessionStateMachine {
    pub fn new(
        registry: Arc<ModelRegistry>,
        extractor: Arc<dyn LandmarkExtractor>,
        config: SessionConfig,
        thresholds: ThresholdConfig,
    ) -> Self {
        let arbiter = Arbiter::new(registry, config.clone(), thresholds);
        Self {
            state: SessionState::Idle,
            mode: None,
            buffer: SequenceBuffer::new(config.dynamic_window),
            cooldown: CooldownController::new(),
            arbiter,
            extractor,
            config,
            dexterity: Dexterity::default(),
            frames_ingested: 0,
            frames_discarded: 0,
            results_emitted: 0,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_stopped(&self) -> bool {
        self.state == SessionState::Stopped
    }

    pub fn frames_ingested(&self) -> u64 {
        self.frames_ingested
    }

    pub fn frames_discarded(&self) -> u64 {
        self.frames_discarded
    }

    pub fn results_emitted(&self) -> u64 {
        self.results_emitted
    }

    // ========================================================================
    // Control messages
    // ========================================================================

    pub async fn on_control(&mut self, msg: ControlMessage) -> Vec<ServerMessage> {
        if self.state == SessionState::Stopped {
            debug!("Control message after stop - ignored");
            return Vec::new();
        }
        if self.state == SessionState::Processing {
            // Defensive: the transport loop serializes events, but overlap
            // must never mutate buffer or state.
            return vec![ServerMessage::error(
                SessionError::ConcurrentOperation.to_string(),
            )];
        }

        match msg {
            ControlMessage::Start {
                model,
                sequence_num,
            } => self.handle_start(model, sequence_num),
            ControlMessage::Process => self.handle_process().await,
            ControlMessage::Stop => self.handle_stop().await,
            ControlMessage::Reset => self.handle_reset(),
            ControlMessage::Config {
                dexterity,
                min_confidence,
            } => {
                if let Some(d) = dexterity {
                    self.dexterity = d;
                }
                self.arbiter.set_min_confidence(min_confidence);
                debug!(dexterity = %self.dexterity, "Session config updated");
                Vec::new()
            }
        }
    }

    fn handle_start(
        &mut self,
        model: ModelMode,
        sequence_num: Option<usize>,
    ) -> Vec<ServerMessage> {
        let capacity = match model {
            ModelMode::Alpha | ModelMode::Numeric => self.config.dynamic_window,
            ModelMode::Glosses => match self.config.resolve_gloss_length(sequence_num) {
                Some(len) => len,
                None => {
                    let requested = sequence_num.unwrap_or(0);
                    warn!(requested, "Rejected unsupported gloss sequence length");
                    return vec![ServerMessage::error(
                        SessionError::UnsupportedSequenceLength(requested).to_string(),
                    )];
                }
            },
        };

        self.mode = Some(model);
        self.buffer.reset_capacity(capacity);
        self.cooldown.clear();
        self.state = SessionState::Collecting;

        info!(mode = %model, window = capacity, "Session started");
        vec![ServerMessage::status(SessionStatus::Collecting)]
    }

    async fn handle_process(&mut self) -> Vec<ServerMessage> {
        let Some(mode) = self.mode else {
            return vec![ServerMessage::error(SessionError::NotStarted.to_string())];
        };
        if self.state == SessionState::Idle {
            return vec![ServerMessage::error(SessionError::NotStarted.to_string())];
        }

        let required = mode.min_frames();
        if self.buffer.len() < required {
            let err = SessionError::InvalidFrameCount {
                mode,
                actual: self.buffer.len(),
                required,
            };
            warn!(%err, "Forced process rejected");
            self.buffer.clear();
            self.state = SessionState::Collecting;
            return vec![ServerMessage::error(err.to_string())];
        }

        self.run_processing(mode, true).await
    }

    /// Drain any buffered frames through one final pass, then stop.
    ///
    /// A sign performed right before disconnect is not silently dropped:
    /// glosses windows are padded by the word model, alpha windows run if
    /// they meet the mode's minimum, and anything shorter reports an empty
    /// result.
    async fn handle_stop(&mut self) -> Vec<ServerMessage> {
        let mut messages = Vec::new();

        if let Some(mode) = self.mode {
            if !self.buffer.is_empty() {
                if self.buffer.len() >= mode.min_frames() {
                    messages = self.run_processing(mode, true).await;
                } else {
                    messages.push(ServerMessage::from(Self::empty_result(mode)));
                }
            }
        }

        info!(
            frames = self.frames_ingested,
            discarded = self.frames_discarded,
            results = self.results_emitted,
            "Session stopped"
        );
        self.state = SessionState::Stopped;
        messages
    }

    fn handle_reset(&mut self) -> Vec<ServerMessage> {
        self.buffer.clear();
        self.cooldown.clear();
        if self.mode.is_some() {
            self.state = SessionState::Collecting;
            debug!("Session reset - buffer and cooldown cleared");
            vec![ServerMessage::status(SessionStatus::Ready)]
        } else {
            self.state = SessionState::Idle;
            Vec::new()
        }
    }

    // ========================================================================
    // Frame messages
    // ========================================================================

    pub async fn on_frame(&mut self, payload: &[u8]) -> Vec<ServerMessage> {
        match self.state {
            SessionState::Stopped => Vec::new(),
            SessionState::Processing => {
                // Lossy by design: stale frames are worthless once a
                // decision is in flight.
                self.frames_discarded += 1;
                Vec::new()
            }
            SessionState::Idle => {
                vec![ServerMessage::error(SessionError::NotStarted.to_string())]
            }
            SessionState::Cooldown => {
                self.frames_discarded += 1;
                let remaining = self.cooldown.tick();
                if remaining == 0 {
                    debug!("Cooldown elapsed - collecting again");
                    self.state = SessionState::Collecting;
                    vec![ServerMessage::status(SessionStatus::Collecting)]
                } else {
                    Vec::new()
                }
            }
            SessionState::Collecting => self.collect_frame(payload).await,
        }
    }

    async fn collect_frame(&mut self, payload: &[u8]) -> Vec<ServerMessage> {
        // Mode is always set in Collecting state.
        let Some(mode) = self.mode else {
            return vec![ServerMessage::error(SessionError::NotStarted.to_string())];
        };

        let dim = mode.frame_dim();
        let frame = match self.extractor.extract(payload, dim, self.dexterity).await {
            Ok(frame) => frame,
            Err(e) => {
                // Decode failures become no-detection frames and are
                // interpolated over, never fatal.
                warn!(error = %e, "Frame decode failed - treating as no detection");
                crate::types::LandmarkFrame::missing(dim)
            }
        };

        self.buffer.push(frame);
        self.frames_ingested += 1;

        let at_threshold = match mode {
            ModelMode::Alpha | ModelMode::Numeric => {
                self.buffer.len() == self.config.early_window
                    || self.buffer.len() >= self.config.dynamic_window
            }
            ModelMode::Glosses => self.buffer.is_full(),
        };

        if at_threshold {
            self.run_processing(mode, false).await
        } else {
            Vec::new()
        }
    }

    /// Called by the transport loop when the peer vanishes without `stop`.
    pub fn on_disconnect(&mut self) {
        if self.state != SessionState::Stopped {
            info!(
                frames = self.frames_ingested,
                results = self.results_emitted,
                "Transport closed - session stopped"
            );
            self.state = SessionState::Stopped;
        }
    }

    // ========================================================================
    // Processing
    // ========================================================================

    async fn run_processing(&mut self, mode: ModelMode, forced: bool) -> Vec<ServerMessage> {
        self.state = SessionState::Processing;
        let mut messages = vec![ServerMessage::status(SessionStatus::Processing)];

        let window = self.buffer.window();
        debug!(frames = window.len(), forced, "Invoking arbiter");

        match self.arbiter.decide(&window, mode, forced).await {
            Ok(Verdict::Continue) => {
                // Early tier declined; the buffer keeps growing toward the
                // full window.
                self.state = SessionState::Collecting;
                messages.push(ServerMessage::status(SessionStatus::Collecting));
            }
            Ok(Verdict::Emit(result)) => {
                self.buffer.clear();
                let empty = result.is_empty();
                let kind = result.dominant_kind();
                messages.push(ServerMessage::from(result));
                messages.push(ServerMessage::status(SessionStatus::Ready));

                if empty {
                    // No confident sign: retry immediately, no suppression.
                    self.state = SessionState::Collecting;
                } else {
                    self.results_emitted += 1;
                    let duration = self.cooldown_frames(kind);
                    if duration > 0 {
                        self.cooldown.arm(duration);
                        self.state = SessionState::Cooldown;
                    } else {
                        self.state = SessionState::Collecting;
                    }
                    info!(kind = %kind, cooldown_frames = duration, "Result emitted");
                }
            }
            Err(SessionError::UndecidableSequence) => {
                // The whole window was detection-free: empty result, no
                // cooldown, immediate retry.
                self.buffer.clear();
                messages.push(ServerMessage::from(Self::empty_result(mode)));
                messages.push(ServerMessage::status(SessionStatus::Ready));
                self.state = SessionState::Collecting;
            }
            Err(e) => {
                warn!(error = %e, "Processing failed - buffer cleared, session continues");
                self.buffer.clear();
                messages.push(ServerMessage::error(e.to_string()));
                self.state = SessionState::Collecting;
            }
        }

        messages
    }

    fn cooldown_frames(&self, kind: ResultKind) -> u32 {
        match kind {
            ResultKind::Letter | ResultKind::Number => self.config.cooldown_static_frames,
            ResultKind::Gesture => self.config.cooldown_dynamic_frames,
            ResultKind::Word => self.config.cooldown_word_frames,
        }
    }

    fn empty_result(mode: ModelMode) -> SignResult {
        match mode {
            ModelMode::Alpha | ModelMode::Numeric => SignResult::empty_alpha_numeric(),
            ModelMode::Glosses => SignResult::empty_word(),
        }
    }
}
