//! Scripted in-process classifier
//!
//! Stands in for a remote model when none is reachable and drives the
//! decision-engine tests: responses are served from a fixed script and every
//! window the port receives is recorded for later assertion.

use std::sync::Mutex;

use async_trait::async_trait;

use super::{ClassifierError, ClassifierPort, Prediction};

/// A classifier port that replays a pre-programmed response sequence.
///
/// Responses are consumed in order; once the script is exhausted the last
/// entry repeats. An empty script always reports the backend unavailable.
pub struct ScriptedClassifier {
    name: String,
    script: Mutex<Vec<Result<Prediction, ClassifierError>>>,
    calls: Mutex<Vec<Vec<Vec<f32>>>>,
}

impl ScriptedClassifier {
    /// A port that always answers with the same label and confidence.
    pub fn fixed(name: &str, label: &str, confidence: f32) -> Self {
        Self::scripted(
            name,
            vec![Ok(Prediction {
                label: label.to_string(),
                confidence,
            })],
        )
    }

    /// A port that replays the given responses in order.
    pub fn scripted(name: &str, script: Vec<Result<Prediction, ClassifierError>>) -> Self {
        Self {
            name: name.to_string(),
            script: Mutex::new(script),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// A port whose backend is permanently down.
    pub fn unavailable(name: &str) -> Self {
        Self::scripted(name, Vec::new())
    }

    /// Number of classify calls received so far.
    pub fn call_count(&self) -> usize {
        self.calls.lock().map(|c| c.len()).unwrap_or(0)
    }

    /// The most recent window this port was invoked with.
    pub fn last_window(&self) -> Option<Vec<Vec<f32>>> {
        self.calls.lock().ok().and_then(|c| c.last().cloned())
    }
}

#[async_trait]
impl ClassifierPort for ScriptedClassifier {
    fn name(&self) -> &str {
        &self.name
    }

    async fn classify(&self, window: &[Vec<f32>]) -> Result<Prediction, ClassifierError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(window.to_vec());
        }

        let mut script = self
            .script
            .lock()
            .map_err(|_| ClassifierError::Unavailable("script lock poisoned".to_string()))?;

        if script.is_empty() {
            return Err(ClassifierError::Unavailable(format!(
                "no scripted response for '{}'",
                self.name
            )));
        }

        if script.len() == 1 {
            script[0].clone()
        } else {
            script.remove(0)
        }
    }
}
