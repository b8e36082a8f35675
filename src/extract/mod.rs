//! Landmark extraction boundary
//!
//! Turns an inbound binary frame payload into a [`LandmarkFrame`]. Two
//! deployments exist:
//!
//! - `landmarks` wire format: clients run pose estimation themselves and
//!   send pre-extracted coordinate vectors as little-endian f32 arrays. An
//!   empty payload is the explicit "no detection" marker.
//! - `image` wire format: clients send encoded image bytes and extraction
//!   happens on the remote inference backend.
//!
//! Decode failures are never fatal: the session turns them into
//! no-detection frames and interpolation covers the hole.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

use crate::config::{InferenceConfig, WireFormat};
use crate::types::{Dexterity, LandmarkFrame};

/// Failures while turning payload bytes into a frame.
#[derive(Debug, Clone, Error)]
pub enum ExtractError {
    /// The payload is not a valid frame for the negotiated wire format.
    #[error("frame decode failed: {0}")]
    Decode(String),

    /// The remote extraction backend could not be reached.
    #[error("extraction backend unavailable: {0}")]
    Unavailable(String),
}

/// Collaborator boundary: raw payload bytes in, landmark frame out.
#[async_trait]
pub trait LandmarkExtractor: Send + Sync {
    async fn extract(
        &self,
        payload: &[u8],
        expected_dim: usize,
        dexterity: Dexterity,
    ) -> Result<LandmarkFrame, ExtractError>;
}

/// Build the extractor matching the configured wire format.
pub fn build_extractor(config: &InferenceConfig) -> anyhow::Result<Arc<dyn LandmarkExtractor>> {
    match config.wire_format {
        WireFormat::Landmarks => Ok(Arc::new(WireVectorCodec)),
        WireFormat::Image => Ok(Arc::new(HttpExtractor::new(config)?)),
    }
}

// ============================================================================
// Pre-extracted vector codec
// ============================================================================

/// Decodes pre-extracted landmark vectors from the wire.
///
/// Payload layout: `expected_dim` little-endian f32 values; an empty payload
/// marks "no detection".
pub struct WireVectorCodec;

#[async_trait]
impl LandmarkExtractor for WireVectorCodec {
    async fn extract(
        &self,
        payload: &[u8],
        expected_dim: usize,
        _dexterity: Dexterity,
    ) -> Result<LandmarkFrame, ExtractError> {
        if payload.is_empty() {
            return Ok(LandmarkFrame::missing(expected_dim));
        }

        let expected_bytes = expected_dim * 4;
        if payload.len() != expected_bytes {
            return Err(ExtractError::Decode(format!(
                "expected {expected_bytes} bytes ({expected_dim} coords), got {}",
                payload.len()
            )));
        }

        let coords = payload
            .chunks_exact(4)
            .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
            .collect::<Vec<f32>>();

        if coords.iter().any(|c| !c.is_finite()) {
            return Err(ExtractError::Decode(
                "payload contains non-finite coordinates".to_string(),
            ));
        }

        Ok(LandmarkFrame::detected(coords))
    }
}

// ============================================================================
// Remote extraction
// ============================================================================

/// Response body from the remote extraction route.
#[derive(Debug, Deserialize)]
struct ExtractResponse {
    present: bool,
    #[serde(default)]
    coords: Vec<f32>,
}

/// Posts encoded image bytes to the inference backend's extraction route.
pub struct HttpExtractor {
    client: reqwest::Client,
    url: String,
}

impl HttpExtractor {
    pub fn new(config: &InferenceConfig) -> anyhow::Result<Self> {
        use anyhow::Context;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to build extraction HTTP client")?;

        Ok(Self {
            client,
            url: format!("{}/extract", config.base_url.trim_end_matches('/')),
        })
    }
}

#[async_trait]
impl LandmarkExtractor for HttpExtractor {
    async fn extract(
        &self,
        payload: &[u8],
        expected_dim: usize,
        dexterity: Dexterity,
    ) -> Result<LandmarkFrame, ExtractError> {
        let response = self
            .client
            .post(&self.url)
            .query(&[("dexterity", dexterity.to_string())])
            .header("content-type", "application/octet-stream")
            .body(payload.to_vec())
            .send()
            .await
            .map_err(|e| ExtractError::Unavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ExtractError::Unavailable(format!(
                "extraction backend returned {}",
                response.status()
            )));
        }

        let body: ExtractResponse = response
            .json()
            .await
            .map_err(|e| ExtractError::Decode(format!("bad response body: {e}")))?;

        if !body.present {
            return Ok(LandmarkFrame::missing(expected_dim));
        }

        if body.coords.len() != expected_dim {
            return Err(ExtractError::Decode(format!(
                "backend returned {} coords, expected {expected_dim}",
                body.coords.len()
            )));
        }

        Ok(LandmarkFrame::detected(body.coords))
    }
}
