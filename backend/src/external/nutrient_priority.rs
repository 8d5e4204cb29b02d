//! Nutrient Priority Client
//!
//! Client for the hosted N / P / K priority models.

use reqwest::Client;
use serde::Serialize;
use shared::{AgronomicDefaults, CropKind, NutrientScores, RipenessLabel, SoilNutrients};

use crate::config::RemoteModelConfig;
use crate::error::{AppError, AppResult};

/// Client for the nutrient priority models
#[derive(Clone)]
pub struct NutrientPriorityClient {
    api_endpoint: String,
    api_key: String,
    http_client: Client,
}

/// Feature row scored by the priority models
#[derive(Debug, Serialize)]
pub struct NutrientPriorityRequest<'a> {
    pub crop: CropKind,
    pub stage: RipenessLabel,
    #[serde(flatten)]
    pub soil: SoilNutrients,
    #[serde(flatten)]
    pub defaults: &'a AgronomicDefaults,
}

impl NutrientPriorityClient {
    /// Create a new nutrient priority client
    pub fn new(config: &RemoteModelConfig) -> AppResult<Self> {
        Ok(Self {
            api_endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone(),
            http_client: super::http_client(config)?,
        })
    }

    /// Score each nutrient for the given crop, stage and soil test
    pub async fn score(&self, request: &NutrientPriorityRequest<'_>) -> AppResult<NutrientScores> {
        let response = self
            .http_client
            .post(&self.api_endpoint)
            .header("x-api-key", &self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| AppError::NutrientModelError(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::NutrientModelError(format!(
                "API returned {}: {}",
                status, body
            )));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::NutrientModelError(format!("Failed to parse response: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_is_a_flat_feature_row() {
        let defaults = AgronomicDefaults::default();
        let request = NutrientPriorityRequest {
            crop: CropKind::Banana,
            stage: RipenessLabel::Unripe,
            soil: SoilNutrients {
                n_mgkg: 12.0,
                p_mgkg: 30.5,
                k_mgkg: 80.0,
            },
            defaults: &defaults,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["crop"], "banana");
        assert_eq!(json["stage"], "unripe");
        assert_eq!(json["N_mgkg"], 12.0);
        assert_eq!(json["K_mgkg"], 80.0);
        assert_eq!(json["irrigation_type"], "drip");
        assert_eq!(json["soil_PH"], 6.5);
    }

    #[test]
    fn test_scores_response_parsing() {
        let scores: NutrientScores =
            serde_json::from_str(r#"{"N": 0.12, "P": 0.81, "K": 0.4}"#).unwrap();
        assert_eq!(scores.p, 0.81);
    }
}
