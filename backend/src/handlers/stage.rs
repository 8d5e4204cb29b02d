//! HTTP handler for crop and ripeness stage detection

use axum::{
    extract::{Multipart, State},
    Json,
};
use shared::StageDetection;

use super::multipart::ImageForm;
use crate::error::{AppError, AppResult};
use crate::AppState;

/// Classify the crop and ripeness stage of an uploaded photo
pub async fn detect_stage(
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<Json<StageDetection>> {
    let classifier = state
        .classifier
        .as_ref()
        .ok_or(AppError::ClassifierUnavailable)?;
    let image = ImageForm::read(multipart).await?.take_image()?;
    let detection = classifier.classify(&image).await?;
    Ok(Json(detection))
}
