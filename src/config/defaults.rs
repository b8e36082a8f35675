//! System-wide default constants.
//!
//! Centralises the decision-engine tuning values so they are discoverable in
//! one place. Every value here can be overridden from `signstream.toml`.

// ============================================================================
// Server
// ============================================================================

/// Default HTTP bind address.
pub const SERVER_ADDR: &str = "0.0.0.0:8080";

// ============================================================================
// Session decision engine
// ============================================================================

/// Labels that require motion to disambiguate. A static snapshot of either
/// is indistinguishable from the end pose of its trace.
pub const DYNAMIC_LABELS: [&str; 2] = ["J", "Z"];

/// Frames for the early static confirmation tier.
pub const EARLY_WINDOW_FRAMES: usize = 2;

/// Frames for the full dynamic-gesture window.
pub const DYNAMIC_WINDOW_FRAMES: usize = 10;

/// Gloss window lengths a client may negotiate.
pub const GLOSS_SEQUENCE_LENGTHS: [usize; 3] = [20, 30, 90];

/// Gloss window when the client does not ask for one.
pub const GLOSS_DEFAULT_LENGTH: usize = 20;

/// Cooldown after a static letter/number result (frames).
///
/// At ~15 fps capture this is roughly half a second - enough for the signer
/// to move off the pose without eating the next sign.
pub const COOLDOWN_STATIC_FRAMES: u32 = 8;

/// Cooldown after a dynamic-gesture result (frames). The trace motion can
/// still be in flight when the result lands.
pub const COOLDOWN_DYNAMIC_FRAMES: u32 = 15;

/// Cooldown after a word result (frames). Whole-body signs settle slowly.
pub const COOLDOWN_WORD_FRAMES: u32 = 30;

// ============================================================================
// Confidence thresholds
// ============================================================================

/// Minimum confidence for the static alphabet classifier.
pub const STATIC_ALPHA_THRESHOLD: f32 = 0.8;

/// Minimum confidence for the static numeric classifier.
pub const STATIC_NUMERIC_THRESHOLD: f32 = 0.8;

/// Minimum confidence for the dynamic two-state classifier.
pub const DYNAMIC_GESTURE_THRESHOLD: f32 = 0.6;

/// Minimum confidence for the word-sequence classifier. The 125-gloss label
/// space spreads probability mass thin, so the floor sits low.
pub const WORD_SEQUENCE_THRESHOLD: f32 = 0.5;

// ============================================================================
// Inference backend
// ============================================================================

/// Default model-server base URL.
pub const INFERENCE_BASE_URL: &str = "http://127.0.0.1:6000";

/// HTTP timeout for inference calls (seconds).
pub const INFERENCE_TIMEOUT_SECS: u64 = 10;
