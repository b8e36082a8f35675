//! Landmark frame and model-mode types

use serde::{Deserialize, Serialize};

/// Coordinates per single-hand frame: 21 landmarks × (x, y, z).
pub const HAND_FRAME_DIM: usize = 63;

/// Coordinates per whole-body holistic frame:
/// pose 33×4 + two hands 21×3 + face 468×3.
pub const HOLISTIC_FRAME_DIM: usize = 1662;

/// One instant of extracted landmarks, or an explicit "no detection".
///
/// Presence is carried by the flag, never inferred from the coordinate
/// values — a real landmark at the origin and a missed detection must stay
/// distinguishable for gap interpolation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LandmarkFrame {
    /// Whether the extractor found a hand/body in this frame.
    pub present: bool,
    /// Normalized coordinates, fixed length for the session's mode.
    pub coords: Vec<f32>,
}

impl LandmarkFrame {
    /// A frame with detected landmarks.
    pub fn detected(coords: Vec<f32>) -> Self {
        Self {
            present: true,
            coords,
        }
    }

    /// An explicit no-detection frame of the given dimension.
    ///
    /// Coordinates hold a neutral sentinel and must not be fed to a
    /// classifier without interpolation.
    pub fn missing(dim: usize) -> Self {
        Self {
            present: false,
            coords: vec![0.0; dim],
        }
    }

    /// Coordinate dimension of this frame.
    pub fn dim(&self) -> usize {
        self.coords.len()
    }
}

/// Recognition mode for a session, fixed by the `start` control message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModelMode {
    /// Fingerspelled alphabet (static hand poses plus the two-state traced letters).
    #[serde(rename = "alpha")]
    Alpha,
    /// Numeric signs (same capture pipeline, numeric label space).
    #[serde(rename = "num")]
    Numeric,
    /// Word-level glosses over whole-body sequences.
    #[serde(rename = "glosses")]
    Glosses,
}

impl ModelMode {
    /// Coordinate dimension of a single frame in this mode.
    pub fn frame_dim(self) -> usize {
        match self {
            ModelMode::Alpha | ModelMode::Numeric => HAND_FRAME_DIM,
            ModelMode::Glosses => HOLISTIC_FRAME_DIM,
        }
    }

    /// Minimum buffered frames required before a forced `process` is valid.
    pub fn min_frames(self) -> usize {
        match self {
            // The static tier needs two frames to confirm.
            ModelMode::Alpha | ModelMode::Numeric => 2,
            // The word model pads short windows, so one frame suffices.
            ModelMode::Glosses => 1,
        }
    }

    /// Whether this mode tolerates a shorter-than-capacity window
    /// (the word model pads or truncates to its fixed input length).
    pub fn supports_partial_window(self) -> bool {
        matches!(self, ModelMode::Glosses)
    }
}

impl std::fmt::Display for ModelMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelMode::Alpha => write!(f, "alpha"),
            ModelMode::Numeric => write!(f, "num"),
            ModelMode::Glosses => write!(f, "glosses"),
        }
    }
}

/// Which hand the signer leads with. Forwarded to the extraction
/// collaborator so mirrored captures land in the dominant-hand slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dexterity {
    #[default]
    Right,
    Left,
}

impl std::fmt::Display for Dexterity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Dexterity::Right => write!(f, "right"),
            Dexterity::Left => write!(f, "left"),
        }
    }
}
