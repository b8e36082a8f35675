//! HTTP-backed classifier port
//!
//! Talks to the model server over JSON: the window is posted to
//! `{base_url}/classify/{model}` and the response carries the top label and
//! its confidence. Any transport or decode failure surfaces as
//! [`ClassifierError::Unavailable`] — the session reports it and stays
//! alive.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{ClassifierError, ClassifierPort, Prediction};
use crate::config::InferenceConfig;

/// Request body for a classify call.
#[derive(Debug, Serialize)]
struct ClassifyRequest<'a> {
    window: &'a [Vec<f32>],
}

/// Response body from the model server.
#[derive(Debug, Deserialize)]
struct ClassifyResponse {
    label: String,
    confidence: f32,
}

/// Build the shared HTTP client for all inference ports.
pub fn build_client(config: &InferenceConfig) -> anyhow::Result<reqwest::Client> {
    use anyhow::Context;

    reqwest::Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()
        .context("Failed to build inference HTTP client")
}

/// One model role on the remote inference server.
pub struct HttpClassifier {
    client: reqwest::Client,
    url: String,
    name: String,
}

impl HttpClassifier {
    pub fn new(client: reqwest::Client, base_url: &str, model: &str) -> Self {
        Self {
            client,
            url: format!("{}/classify/{}", base_url.trim_end_matches('/'), model),
            name: model.to_string(),
        }
    }
}

#[async_trait]
impl ClassifierPort for HttpClassifier {
    fn name(&self) -> &str {
        &self.name
    }

    async fn classify(&self, window: &[Vec<f32>]) -> Result<Prediction, ClassifierError> {
        let response = self
            .client
            .post(&self.url)
            .json(&ClassifyRequest { window })
            .send()
            .await
            .map_err(|e| ClassifierError::Unavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ClassifierError::Unavailable(format!(
                "model server returned {}",
                response.status()
            )));
        }

        let body: ClassifyResponse = response
            .json()
            .await
            .map_err(|e| ClassifierError::Unavailable(format!("bad response body: {e}")))?;

        tracing::debug!(
            model = %self.name,
            label = %body.label,
            confidence = body.confidence,
            frames = window.len(),
            "Classifier call complete"
        );

        Ok(Prediction {
            label: body.label,
            confidence: body.confidence,
        })
    }
}
