//! HTTP handler for the end-to-end pipeline

use axum::{
    extract::{Multipart, State},
    Json,
};

use super::multipart::ImageForm;
use crate::error::AppResult;
use crate::services::pipeline::{run_pipeline, PipelineInput, PipelineResult};
use crate::AppState;

/// Run stage detection, fertilizer recommendation and harvest prediction
pub async fn run_full_pipeline(
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<Json<PipelineResult>> {
    let mut form = ImageForm::read(multipart).await?;
    let input = PipelineInput {
        image: form.take_image()?,
        crop: form.text("crop").map(str::to_string),
        stage: form.text("stage").map(str::to_string),
        n_mgkg: form.require_number("n_mgkg")?,
        p_mgkg: form.require_number("p_mgkg")?,
        k_mgkg: form.require_number("k_mgkg")?,
    };
    let result = run_pipeline(&state, input).await?;
    Ok(Json(result))
}
