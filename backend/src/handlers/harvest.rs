//! HTTP handler for harvest window prediction

use axum::{
    extract::{Multipart, State},
    Json,
};
use serde::Serialize;
use shared::{CropKind, RipenessLabel};

use super::multipart::ImageForm;
use crate::error::AppResult;
use crate::services::feature_extraction::{decode_image, quality_check};
use crate::services::harvest_prediction::HarvestPrediction;
use crate::services::run_blocking;
use crate::AppState;

#[derive(Serialize)]
pub struct HarvestPredictionResponse {
    #[serde(flatten)]
    pub prediction: HarvestPrediction,
    pub warnings: Vec<String>,
}

/// Predict the harvest window from a photo and its crop / stage labels
pub async fn predict_harvest(
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<Json<HarvestPredictionResponse>> {
    let mut form = ImageForm::read(multipart).await?;
    let bytes = form.take_image()?;
    let crop: CropKind = form.require_text("crop")?.parse()?;
    let stage: RipenessLabel = form.require_text("stage")?.parse()?;

    let predictor = state.harvest.clone();
    let limits = state.config.images.clone();
    let (prediction, warning) = run_blocking(move || {
        let image = decode_image(&bytes)?;
        let warning = quality_check(&image, &limits);
        Ok((predictor.predict(&image, crop, stage)?, warning))
    })
    .await?;

    Ok(Json(HarvestPredictionResponse {
        prediction,
        warnings: warning.into_iter().collect(),
    }))
}
