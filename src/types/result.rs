//! Classification result types

use serde::{Deserialize, Serialize};

/// What kind of sign a classifier produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResultKind {
    /// Static fingerspelled letter (held hand pose).
    Letter,
    /// Static numeric sign.
    Number,
    /// Word-level gloss from a whole-body sequence.
    Word,
    /// Motion-dependent letter confirmed by the dynamic two-state model.
    Gesture,
}

impl std::fmt::Display for ResultKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResultKind::Letter => write!(f, "Letter"),
            ResultKind::Number => write!(f, "Number"),
            ResultKind::Word => write!(f, "Word"),
            ResultKind::Gesture => write!(f, "Gesture"),
        }
    }
}

/// One classifier outcome, gated by its confidence threshold.
///
/// An empty label with confidence 0 means "no confident sign"; a gated
/// result keeps the raw confidence for observability while blanking the
/// label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub label: String,
    pub confidence: f32,
    pub kind: ResultKind,
}

impl ClassificationResult {
    pub fn new(label: impl Into<String>, confidence: f32, kind: ResultKind) -> Self {
        Self {
            label: label.into(),
            confidence,
            kind,
        }
    }

    /// The "no confident sign" sentinel.
    pub fn none(kind: ResultKind) -> Self {
        Self {
            label: String::new(),
            confidence: 0.0,
            kind,
        }
    }

    /// Blank the label but keep the reported confidence.
    pub fn gated(mut self) -> Self {
        self.label.clear();
        self
    }

    pub fn is_empty(&self) -> bool {
        self.label.is_empty()
    }
}

/// A single authoritative decision emitted for one detected sign.
#[derive(Debug, Clone, PartialEq)]
pub enum SignResult {
    /// Alpha/Numeric modes report a letter slot and a number slot together —
    /// the two alphabets are not mutually exclusive at the protocol level.
    AlphaNumeric {
        letter: ClassificationResult,
        number: ClassificationResult,
    },
    /// Glosses mode reports a single word slot.
    Word(ClassificationResult),
}

impl SignResult {
    /// A decision with no confident sign in any slot.
    pub fn empty_alpha_numeric() -> Self {
        Self::AlphaNumeric {
            letter: ClassificationResult::none(ResultKind::Letter),
            number: ClassificationResult::none(ResultKind::Number),
        }
    }

    /// The empty word decision.
    pub fn empty_word() -> Self {
        Self::Word(ClassificationResult::none(ResultKind::Word))
    }

    /// True when no slot carries a confident label. Empty results never arm
    /// the cooldown.
    pub fn is_empty(&self) -> bool {
        match self {
            SignResult::AlphaNumeric { letter, number } => {
                letter.is_empty() && number.is_empty()
            }
            SignResult::Word(word) => word.is_empty(),
        }
    }

    /// Dominant kind of the decision, used to pick the cooldown duration.
    /// The letter slot wins over the number slot when both are confident.
    pub fn dominant_kind(&self) -> ResultKind {
        match self {
            SignResult::AlphaNumeric { letter, number } => {
                if !letter.is_empty() {
                    letter.kind
                } else {
                    number.kind
                }
            }
            SignResult::Word(word) => word.kind,
        }
    }
}
