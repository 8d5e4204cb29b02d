//! Stage Classifier Client
//!
//! Client for the hosted crop and ripeness classifier.

use base64::{engine::general_purpose::STANDARD, Engine};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use shared::{round2, validate_confidence_percent, CropKind, RipenessLabel, StageDetection};

use crate::config::RemoteModelConfig;
use crate::error::{AppError, AppResult};

/// Client for the crop / ripeness classifier
#[derive(Clone)]
pub struct StageClassifierClient {
    api_endpoint: String,
    api_key: String,
    http_client: Client,
}

/// Request to classify an image
#[derive(Debug, Serialize)]
pub struct ClassifyStageRequest {
    pub image_base64: String,
}

/// Response from the classifier API
#[derive(Debug, Deserialize)]
pub struct ClassifyStageResponse {
    pub crop: String,
    pub stage: String,
    pub crop_confidence: f64,
    pub stage_confidence: f64,
}

impl ClassifyStageResponse {
    /// Parse labels into the closed enumerations
    pub fn into_detection(self) -> AppResult<StageDetection> {
        let crop: CropKind = self.crop.parse()?;
        let stage: RipenessLabel = self.stage.parse()?;
        for confidence in [self.crop_confidence, self.stage_confidence] {
            validate_confidence_percent(confidence).map_err(|msg| {
                AppError::StageClassifierError(format!("{} (got {})", msg, confidence))
            })?;
        }

        Ok(StageDetection {
            crop,
            stage,
            crop_confidence: round2(self.crop_confidence),
            stage_confidence: round2(self.stage_confidence),
        })
    }
}

impl StageClassifierClient {
    /// Create a new classifier client
    pub fn new(config: &RemoteModelConfig) -> AppResult<Self> {
        Ok(Self {
            api_endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone(),
            http_client: super::http_client(config)?,
        })
    }

    /// Send an encoded image for crop and stage classification
    pub async fn classify(&self, image_bytes: &[u8]) -> AppResult<StageDetection> {
        let request = ClassifyStageRequest {
            image_base64: STANDARD.encode(image_bytes),
        };

        let response = self
            .http_client
            .post(&self.api_endpoint)
            .header("x-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::StageClassifierError(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::StageClassifierError(format!(
                "API returned {}: {}",
                status, body
            )));
        }

        let result: ClassifyStageResponse = response.json().await.map_err(|e| {
            AppError::StageClassifierError(format!("Failed to parse response: {}", e))
        })?;

        tracing::debug!(
            crop = %result.crop,
            stage = %result.stage,
            "Stage classifier responded"
        );

        result.into_detection()
    }
}
