//! Session Protocol Integration Tests
//!
//! Exercises the full per-connection stack - state machine, buffer,
//! interpolation, arbiter, cooldown - with scripted classifier ports.
//! Asserts on the end-to-end scenarios the protocol guarantees: early
//! confirmation, gap-free word windows, forced-process validation, and
//! stop-drain.

use std::sync::Arc;

use signstream::classify::{ModelRegistry, Prediction, ScriptedClassifier};
use signstream::config::{SessionConfig, ThresholdConfig};
use signstream::extract::WireVectorCodec;
use signstream::session::{SessionState, SessionStateMachine};
use signstream::types::{ControlMessage, ModelMode, ServerMessage, SessionStatus};

/// Encode a coordinate vector as a little-endian f32 wire payload.
fn payload(coords: &[f32]) -> Vec<u8> {
    coords.iter().flat_map(|c| c.to_le_bytes()).collect()
}

fn hand_payload(value: f32) -> Vec<u8> {
    payload(&vec![value; 63])
}

fn holistic_payload(value: f32) -> Vec<u8> {
    payload(&vec![value; 1662])
}

struct TestRig {
    machine: SessionStateMachine,
    alpha: Arc<ScriptedClassifier>,
    numeric: Arc<ScriptedClassifier>,
    dynamic: Arc<ScriptedClassifier>,
    word: Arc<ScriptedClassifier>,
}

fn build_rig(
    alpha: ScriptedClassifier,
    numeric: ScriptedClassifier,
    dynamic: ScriptedClassifier,
    word: ScriptedClassifier,
) -> TestRig {
    let alpha = Arc::new(alpha);
    let numeric = Arc::new(numeric);
    let dynamic = Arc::new(dynamic);
    let word = Arc::new(word);

    let registry = Arc::new(ModelRegistry {
        static_alpha: alpha.clone(),
        static_numeric: numeric.clone(),
        dynamic_gesture: dynamic.clone(),
        word_sequence: word.clone(),
    });

    let machine = SessionStateMachine::new(
        registry,
        Arc::new(WireVectorCodec),
        SessionConfig::default(),
        ThresholdConfig::default(),
    );

    TestRig {
        machine,
        alpha,
        numeric,
        dynamic,
        word,
    }
}

fn pred(label: &str, confidence: f32) -> Prediction {
    Prediction {
        label: label.to_string(),
        confidence,
    }
}

/// Extract the letter slot from a message batch.
fn letter_of(messages: &[ServerMessage]) -> Option<(String, f32)> {
    messages.iter().find_map(|m| match m {
        ServerMessage::AlphaNumeric {
            letter,
            confidence_letter,
            ..
        } => Some((letter.clone(), *confidence_letter)),
        _ => None,
    })
}

/// Extract the word slot from a message batch.
fn word_of(messages: &[ServerMessage]) -> Option<(String, f32)> {
    messages.iter().find_map(|m| match m {
        ServerMessage::Word { word, confidence } => Some((word.clone(), *confidence)),
        _ => None,
    })
}

async fn start(rig: &mut TestRig, mode: ModelMode, seq: Option<usize>) {
    let messages = rig
        .machine
        .on_control(ControlMessage::Start {
            model: mode,
            sequence_num: seq,
        })
        .await;
    assert_eq!(
        messages,
        vec![ServerMessage::status(SessionStatus::Collecting)]
    );
}

/// Scenario A: two identical static frames confirm without waiting for a
/// longer window.
#[tokio::test]
async fn alpha_early_confirmation_needs_only_two_frames() {
    let mut rig = build_rig(
        ScriptedClassifier::fixed("static-alpha", "A", 0.95),
        ScriptedClassifier::fixed("static-numeric", "6", 0.4),
        ScriptedClassifier::unavailable("dynamic-gesture"),
        ScriptedClassifier::unavailable("word-sequence"),
    );
    start(&mut rig, ModelMode::Alpha, None).await;

    assert!(rig.machine.on_frame(&hand_payload(0.1)).await.is_empty());
    let messages = rig.machine.on_frame(&hand_payload(0.1)).await;

    let (letter, confidence) = letter_of(&messages).expect("letter result");
    assert_eq!(letter, "A");
    assert!((confidence - 0.95).abs() < 1e-6);

    // Exactly two static-alpha calls, no dynamic-model involvement.
    assert_eq!(rig.alpha.call_count(), 2);
    assert_eq!(rig.dynamic.call_count(), 0);
    // Numeric ran alongside on the invocation that reached the static model.
    assert_eq!(rig.numeric.call_count(), 1);
}

/// Scenario B: a dropped detection mid-window is interpolated before the
/// word classifier runs - exactly one call, gap-free tensor.
#[tokio::test]
async fn glosses_window_interpolated_before_single_inference() {
    let mut rig = build_rig(
        ScriptedClassifier::unavailable("static-alpha"),
        ScriptedClassifier::unavailable("static-numeric"),
        ScriptedClassifier::unavailable("dynamic-gesture"),
        ScriptedClassifier::fixed("word-sequence", "THANKS", 0.83),
    );
    start(&mut rig, ModelMode::Glosses, Some(20)).await;

    for i in 0..20 {
        let messages = if i == 10 {
            // Explicit no-detection marker: empty payload.
            rig.machine.on_frame(&[]).await
        } else {
            rig.machine.on_frame(&holistic_payload(i as f32 * 0.01)).await
        };
        if i < 19 {
            assert!(messages.is_empty(), "unexpected messages at frame {i}");
        } else {
            let (word, confidence) = word_of(&messages).expect("word result");
            assert_eq!(word, "THANKS");
            assert!((confidence - 0.83).abs() < 1e-6);
        }
    }

    assert_eq!(rig.word.call_count(), 1);
    let seen = rig.word.last_window().expect("recorded window");
    assert_eq!(seen.len(), 20);

    // Frame 10 was lerped between frames 9 and 11; every coordinate lies
    // between its real neighbors.
    let (lo, hi) = (0.09_f32, 0.11_f32);
    for c in &seen[10] {
        assert!(*c >= lo - 1e-6 && *c <= hi + 1e-6, "coord {c} out of range");
    }
}

/// Scenario C: a forced `process` below the mode's minimum is rejected
/// without touching a classifier.
#[tokio::test]
async fn alpha_process_with_one_frame_rejected() {
    let mut rig = build_rig(
        ScriptedClassifier::fixed("static-alpha", "A", 0.95),
        ScriptedClassifier::fixed("static-numeric", "1", 0.9),
        ScriptedClassifier::unavailable("dynamic-gesture"),
        ScriptedClassifier::unavailable("word-sequence"),
    );
    start(&mut rig, ModelMode::Alpha, None).await;

    rig.machine.on_frame(&hand_payload(0.1)).await;
    let messages = rig.machine.on_control(ControlMessage::Process).await;

    let ServerMessage::Error { error } = &messages[0] else {
        panic!("expected an error, got {:?}", messages[0]);
    };
    assert!(error.contains("invalid frame count"), "got: {error}");
    assert_eq!(rig.alpha.call_count(), 0);
    assert_eq!(rig.machine.state(), SessionState::Collecting);

    // The buffer was cleared: the next two frames form a fresh
    // confirmation pair.
    rig.machine.on_frame(&hand_payload(0.2)).await;
    let messages = rig.machine.on_frame(&hand_payload(0.2)).await;
    assert!(letter_of(&messages).is_some());
}

/// Scenario D: `stop` with a partial glosses buffer runs one final padded
/// pass, then the session accepts nothing further.
#[tokio::test]
async fn glosses_stop_drains_partial_window() {
    let mut rig = build_rig(
        ScriptedClassifier::unavailable("static-alpha"),
        ScriptedClassifier::unavailable("static-numeric"),
        ScriptedClassifier::unavailable("dynamic-gesture"),
        ScriptedClassifier::fixed("word-sequence", "GOODBYE", 0.7),
    );
    start(&mut rig, ModelMode::Glosses, Some(20)).await;

    for i in 0..5 {
        rig.machine.on_frame(&holistic_payload(i as f32 * 0.1)).await;
    }
    let messages = rig.machine.on_control(ControlMessage::Stop).await;

    let (word, _) = word_of(&messages).expect("drained word result");
    assert_eq!(word, "GOODBYE");
    // One call, on the 5 frames collected so far (the word model pads).
    assert_eq!(rig.word.call_count(), 1);
    assert_eq!(rig.word.last_window().expect("window").len(), 5);

    assert!(rig.machine.is_stopped());
    assert!(rig.machine.on_frame(&holistic_payload(0.5)).await.is_empty());
    assert!(rig
        .machine
        .on_control(ControlMessage::Process)
        .await
        .is_empty());
    assert_eq!(rig.word.call_count(), 1);
}

/// Full round trip: Collecting -> Processing -> Cooldown -> (D frames) ->
/// Collecting, then a second result from a fresh buffer.
#[tokio::test]
async fn cooldown_round_trip_accepts_fresh_buffer() {
    let config = SessionConfig {
        cooldown_static_frames: 4,
        ..SessionConfig::default()
    };
    let alpha = Arc::new(ScriptedClassifier::fixed("static-alpha", "B", 0.9));
    let registry = Arc::new(ModelRegistry {
        static_alpha: alpha.clone(),
        static_numeric: Arc::new(ScriptedClassifier::fixed("static-numeric", "1", 0.1)),
        dynamic_gesture: Arc::new(ScriptedClassifier::unavailable("dynamic-gesture")),
        word_sequence: Arc::new(ScriptedClassifier::unavailable("word-sequence")),
    });
    let mut machine = SessionStateMachine::new(
        registry,
        Arc::new(WireVectorCodec),
        config,
        ThresholdConfig::default(),
    );

    machine
        .on_control(ControlMessage::Start {
            model: ModelMode::Alpha,
            sequence_num: None,
        })
        .await;

    // First confirmation.
    machine.on_frame(&hand_payload(0.1)).await;
    let messages = machine.on_frame(&hand_payload(0.1)).await;
    assert!(letter_of(&messages).is_some());
    assert_eq!(machine.state(), SessionState::Cooldown);

    // Exactly D frames elapse the cooldown.
    for i in 0..4 {
        let messages = machine.on_frame(&hand_payload(0.5)).await;
        if i < 3 {
            assert!(messages.is_empty());
        } else {
            assert_eq!(
                messages,
                vec![ServerMessage::status(SessionStatus::Collecting)]
            );
        }
    }
    assert_eq!(machine.state(), SessionState::Collecting);

    // A fresh buffer produces a second result.
    machine.on_frame(&hand_payload(0.2)).await;
    let messages = machine.on_frame(&hand_payload(0.2)).await;
    assert!(letter_of(&messages).is_some());
    assert_eq!(machine.results_emitted(), 2);
}

/// Results come out in the order their windows completed.
#[tokio::test]
async fn results_preserve_buffer_completion_order() {
    let registry = Arc::new(ModelRegistry {
        static_alpha: Arc::new(ScriptedClassifier::scripted(
            "static-alpha",
            vec![
                Ok(pred("C", 0.9)),
                Ok(pred("C", 0.9)),
                Ok(pred("D", 0.9)),
                Ok(pred("D", 0.9)),
            ],
        )),
        static_numeric: Arc::new(ScriptedClassifier::fixed("static-numeric", "1", 0.1)),
        dynamic_gesture: Arc::new(ScriptedClassifier::unavailable("dynamic-gesture")),
        word_sequence: Arc::new(ScriptedClassifier::unavailable("word-sequence")),
    });
    // No cooldown so the second window follows immediately.
    let mut machine = SessionStateMachine::new(
        registry,
        Arc::new(WireVectorCodec),
        SessionConfig {
            cooldown_static_frames: 0,
            ..SessionConfig::default()
        },
        ThresholdConfig::default(),
    );
    machine
        .on_control(ControlMessage::Start {
            model: ModelMode::Alpha,
            sequence_num: None,
        })
        .await;

    let mut letters = Vec::new();
    for _ in 0..2 {
        machine.on_frame(&hand_payload(0.1)).await;
        let messages = machine.on_frame(&hand_payload(0.1)).await;
        if let Some((letter, _)) = letter_of(&messages) {
            letters.push(letter);
        }
    }
    assert_eq!(letters, vec!["C".to_string(), "D".to_string()]);
}

/// The protocol status sequence around a decision:
/// processing -> result -> ready.
#[tokio::test]
async fn status_sequence_wraps_each_decision() {
    let mut rig = build_rig(
        ScriptedClassifier::fixed("static-alpha", "E", 0.9),
        ScriptedClassifier::fixed("static-numeric", "1", 0.1),
        ScriptedClassifier::unavailable("dynamic-gesture"),
        ScriptedClassifier::unavailable("word-sequence"),
    );
    start(&mut rig, ModelMode::Alpha, None).await;

    rig.machine.on_frame(&hand_payload(0.1)).await;
    let messages = rig.machine.on_frame(&hand_payload(0.1)).await;

    assert_eq!(
        messages[0],
        ServerMessage::status(SessionStatus::Processing)
    );
    assert!(matches!(messages[1], ServerMessage::AlphaNumeric { .. }));
    assert_eq!(messages[2], ServerMessage::status(SessionStatus::Ready));
}
