//! Wire protocol for the translation WebSocket
//!
//! Inbound text messages are JSON control messages tagged by `type`;
//! inbound binary messages carry frame payloads. Outbound messages are
//! status updates, per-mode results, and errors, with field names fixed by
//! the client contract.

use serde::{Deserialize, Serialize};

use super::landmark::{Dexterity, ModelMode};
use super::result::SignResult;

/// Inbound control messages.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ControlMessage {
    /// Begin a session: fixes the model mode and, for glosses, the window
    /// length the client will stream.
    Start {
        model: ModelMode,
        #[serde(rename = "sequenceNum", default)]
        sequence_num: Option<usize>,
    },
    /// Client signals the gesture is complete — force a processing pass.
    Process,
    /// End the session, draining any buffered frames first.
    Stop,
    /// Clear buffer and cooldown, keep the mode.
    Reset,
    /// Runtime tuning for this session only.
    Config {
        #[serde(default)]
        dexterity: Option<Dexterity>,
        /// Optional per-session override of the minimum confidence applied
        /// to every classifier.
        #[serde(rename = "minConfidence", default)]
        min_confidence: Option<f32>,
    },
}

/// Session status strings sent to the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    /// Accepting frames toward the next decision.
    Collecting,
    /// An inference call is in flight; sent frames will be dropped.
    Processing,
    /// A result was just emitted; the client should reset its frame counter.
    Ready,
}

/// Outbound messages.
///
/// Untagged: each variant has a distinct field set the client dispatches on
/// (`status` / `letter` / `word` / `error`).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ServerMessage {
    Status {
        status: SessionStatus,
    },
    AlphaNumeric {
        letter: String,
        #[serde(rename = "confidenceLetter")]
        confidence_letter: f32,
        number: String,
        #[serde(rename = "confidenceNumber")]
        confidence_number: f32,
    },
    Word {
        word: String,
        confidence: f32,
    },
    Error {
        error: String,
    },
}

impl ServerMessage {
    pub fn status(status: SessionStatus) -> Self {
        Self::Status { status }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            error: message.into(),
        }
    }

    /// Encode to the JSON text sent over the socket.
    pub fn to_json(&self) -> String {
        // Serialization of these closed shapes cannot fail; fall back to a
        // plain error body rather than panicking mid-session.
        serde_json::to_string(self)
            .unwrap_or_else(|_| r#"{"error":"internal serialization failure"}"#.to_string())
    }
}

impl From<SignResult> for ServerMessage {
    fn from(result: SignResult) -> Self {
        match result {
            SignResult::AlphaNumeric { letter, number } => ServerMessage::AlphaNumeric {
                letter: letter.label,
                confidence_letter: letter.confidence,
                number: number.label,
                confidence_number: number.confidence,
            },
            SignResult::Word(word) => ServerMessage::Word {
                word: word.label,
                confidence: word.confidence,
            },
        }
    }
}

/// Parse an inbound text message.
pub fn parse_control(text: &str) -> Result<ControlMessage, serde_json::Error> {
    serde_json::from_str(text)
}
