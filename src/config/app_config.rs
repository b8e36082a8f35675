//! Application configuration - all session tuning as operator-editable TOML
//!
//! Every threshold and window length the decision engine uses is a field in
//! this module. Each struct implements `Default` with values matching the
//! shipped model stack, so behavior is unchanged when no config file is
//! present.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use super::defaults;

// ============================================================================
// Top-Level Config
// ============================================================================

/// Root configuration for a deployment.
///
/// Load with `AppConfig::load()` which searches:
/// 1. `$SIGNSTREAM_CONFIG` env var
/// 2. `./signstream.toml`
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Session decision-engine tuning
    #[serde(default)]
    pub session: SessionConfig,

    /// Per-classifier confidence thresholds
    #[serde(default)]
    pub thresholds: ThresholdConfig,

    /// Inference backend endpoints
    #[serde(default)]
    pub inference: InferenceConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            session: SessionConfig::default(),
            thresholds: ThresholdConfig::default(),
            inference: InferenceConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration using the standard search order:
    /// 1. `$SIGNSTREAM_CONFIG` environment variable
    /// 2. `./signstream.toml` in the current working directory
    /// 3. Built-in defaults
    pub fn load() -> Self {
        if let Ok(path) = std::env::var("SIGNSTREAM_CONFIG") {
            let p = PathBuf::from(&path);
            if p.exists() {
                match Self::load_from_file(&p) {
                    Ok(config) => {
                        info!(path = %p.display(), "Loaded config from SIGNSTREAM_CONFIG");
                        return config;
                    }
                    Err(e) => {
                        warn!(path = %p.display(), error = %e, "Failed to load config from SIGNSTREAM_CONFIG, falling back");
                    }
                }
            } else {
                warn!(path = %path, "SIGNSTREAM_CONFIG points to non-existent file, falling back");
            }
        }

        let local = Path::new("signstream.toml");
        if local.exists() {
            match Self::load_from_file(local) {
                Ok(config) => {
                    info!(path = %local.display(), "Loaded config from working directory");
                    return config;
                }
                Err(e) => {
                    warn!(path = %local.display(), error = %e, "Failed to load local config, using defaults");
                }
            }
        }

        info!("No config file found, using built-in defaults");
        Self::default()
    }

    /// Load and parse a specific TOML file.
    pub fn load_from_file(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the decision engine cannot run with.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.session.early_window != 2 {
            anyhow::bail!(
                "session.early_window must be 2 (two-frame confirmation), got {}",
                self.session.early_window
            );
        }
        if self.session.dynamic_window <= self.session.early_window {
            anyhow::bail!(
                "session.dynamic_window ({}) must exceed early_window ({})",
                self.session.dynamic_window,
                self.session.early_window
            );
        }
        if self.session.gloss_sequence_lengths.is_empty() {
            anyhow::bail!("session.gloss_sequence_lengths must not be empty");
        }
        for t in [
            self.thresholds.static_alpha,
            self.thresholds.static_numeric,
            self.thresholds.dynamic_gesture,
            self.thresholds.word_sequence,
        ] {
            if !(0.0..=1.0).contains(&t) {
                anyhow::bail!("confidence thresholds must lie in [0,1], got {t}");
            }
        }
        Ok(())
    }
}

// ============================================================================
// Sections
// ============================================================================

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address, overridable via `SIGNSTREAM_SERVER_ADDR` or `--addr`.
    #[serde(default = "default_server_addr")]
    pub addr: String,
}

fn default_server_addr() -> String {
    defaults::SERVER_ADDR.to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: default_server_addr(),
        }
    }
}

/// Decision-engine tuning shared by every session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Labels whose meaning depends on motion; they can never confirm via
    /// the static two-frame tier.
    #[serde(default = "default_dynamic_labels")]
    pub dynamic_labels: Vec<String>,

    /// Frames needed for the early static confirmation tier.
    #[serde(default = "default_early_window")]
    pub early_window: usize,

    /// Frames needed for the full dynamic-gesture window.
    #[serde(default = "default_dynamic_window")]
    pub dynamic_window: usize,

    /// Gloss window lengths a client may negotiate via `sequenceNum`.
    #[serde(default = "default_gloss_sequence_lengths")]
    pub gloss_sequence_lengths: Vec<usize>,

    /// Gloss window used when the client does not send `sequenceNum`.
    #[serde(default = "default_gloss_default_length")]
    pub gloss_default_length: usize,

    /// Cooldown frames after a static letter/number result.
    #[serde(default = "default_cooldown_static")]
    pub cooldown_static_frames: u32,

    /// Cooldown frames after a dynamic-gesture result.
    #[serde(default = "default_cooldown_dynamic")]
    pub cooldown_dynamic_frames: u32,

    /// Cooldown frames after a word result.
    #[serde(default = "default_cooldown_word")]
    pub cooldown_word_frames: u32,
}

fn default_dynamic_labels() -> Vec<String> {
    defaults::DYNAMIC_LABELS.iter().map(|s| s.to_string()).collect()
}
fn default_early_window() -> usize {
    defaults::EARLY_WINDOW_FRAMES
}
fn default_dynamic_window() -> usize {
    defaults::DYNAMIC_WINDOW_FRAMES
}
fn default_gloss_sequence_lengths() -> Vec<usize> {
    defaults::GLOSS_SEQUENCE_LENGTHS.to_vec()
}
fn default_gloss_default_length() -> usize {
    defaults::GLOSS_DEFAULT_LENGTH
}
fn default_cooldown_static() -> u32 {
    defaults::COOLDOWN_STATIC_FRAMES
}
fn default_cooldown_dynamic() -> u32 {
    defaults::COOLDOWN_DYNAMIC_FRAMES
}
fn default_cooldown_word() -> u32 {
    defaults::COOLDOWN_WORD_FRAMES
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            dynamic_labels: default_dynamic_labels(),
            early_window: default_early_window(),
            dynamic_window: default_dynamic_window(),
            gloss_sequence_lengths: default_gloss_sequence_lengths(),
            gloss_default_length: default_gloss_default_length(),
            cooldown_static_frames: default_cooldown_static(),
            cooldown_dynamic_frames: default_cooldown_dynamic(),
            cooldown_word_frames: default_cooldown_word(),
        }
    }
}

impl SessionConfig {
    /// Whether a label belongs to the reserved dynamic-gesture set.
    pub fn is_dynamic_label(&self, label: &str) -> bool {
        self.dynamic_labels.iter().any(|l| l == label)
    }

    /// Resolve the gloss window length from a client's `sequenceNum`.
    /// Unlisted lengths are rejected so a typo cannot silently reshape the
    /// word model's input.
    pub fn resolve_gloss_length(&self, requested: Option<usize>) -> Option<usize> {
        match requested {
            None => Some(self.gloss_default_length),
            Some(n) if self.gloss_sequence_lengths.contains(&n) => Some(n),
            Some(_) => None,
        }
    }
}

/// Minimum confidence per classifier; results below the line are reported
/// as "no sign" with the raw confidence preserved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThresholdConfig {
    #[serde(default = "default_static_alpha_threshold")]
    pub static_alpha: f32,
    #[serde(default = "default_static_numeric_threshold")]
    pub static_numeric: f32,
    #[serde(default = "default_dynamic_threshold")]
    pub dynamic_gesture: f32,
    #[serde(default = "default_word_threshold")]
    pub word_sequence: f32,
}

fn default_static_alpha_threshold() -> f32 {
    defaults::STATIC_ALPHA_THRESHOLD
}
fn default_static_numeric_threshold() -> f32 {
    defaults::STATIC_NUMERIC_THRESHOLD
}
fn default_dynamic_threshold() -> f32 {
    defaults::DYNAMIC_GESTURE_THRESHOLD
}
fn default_word_threshold() -> f32 {
    defaults::WORD_SEQUENCE_THRESHOLD
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            static_alpha: default_static_alpha_threshold(),
            static_numeric: default_static_numeric_threshold(),
            dynamic_gesture: default_dynamic_threshold(),
            word_sequence: default_word_threshold(),
        }
    }
}

/// How binary frame payloads reach the landmark extractor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WireFormat {
    /// Clients send pre-extracted landmark vectors (little-endian f32).
    Landmarks,
    /// Clients send encoded image bytes; extraction happens on the
    /// inference backend.
    Image,
}

/// Remote inference backend settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InferenceConfig {
    /// Frame payload format on the wire.
    #[serde(default = "default_wire_format")]
    pub wire_format: WireFormat,

    /// Base URL of the model server (static/dynamic/word classify routes and
    /// the landmark extraction route hang off this).
    #[serde(default = "default_inference_base_url")]
    pub base_url: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_inference_timeout")]
    pub timeout_secs: u64,
}

fn default_wire_format() -> WireFormat {
    WireFormat::Landmarks
}
fn default_inference_base_url() -> String {
    defaults::INFERENCE_BASE_URL.to_string()
}
fn default_inference_timeout() -> u64 {
    defaults::INFERENCE_TIMEOUT_SECS
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            wire_format: default_wire_format(),
            base_url: default_inference_base_url(),
            timeout_secs: default_inference_timeout(),
        }
    }
}
