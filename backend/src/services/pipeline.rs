//! End-to-end pipeline: stage detection, fertilizer, harvest window

use serde::Serialize;
use shared::{CropKind, RipenessLabel, StageDetection};
use uuid::Uuid;

use super::feature_extraction::{decode_image, quality_check};
use super::fertilizer::{FertilizerInput, FertilizerRecommendation};
use super::harvest_prediction::HarvestPrediction;
use super::run_blocking;
use crate::error::{AppError, AppResult};
use crate::external::StageClassifierClient;
use crate::AppState;

/// Raw pipeline request fields
#[derive(Debug, Default)]
pub struct PipelineInput {
    pub image: Vec<u8>,
    pub crop: Option<String>,
    pub stage: Option<String>,
    pub n_mgkg: f64,
    pub p_mgkg: f64,
    pub k_mgkg: f64,
}

/// Pipeline result
#[derive(Debug, Serialize)]
pub struct PipelineResult {
    pub request_id: Uuid,
    pub crop: CropKind,
    pub stage: RipenessLabel,
    /// Classifier output, when the classifier was consulted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detection: Option<StageDetection>,
    pub fertilizer: FertilizerRecommendation,
    pub harvest: HarvestPrediction,
    pub warnings: Vec<String>,
}

/// Decide crop and stage. Caller-supplied labels take precedence over the
/// classifier; the classifier is only called when a label is missing.
pub async fn resolve_stage(
    classifier: Option<&StageClassifierClient>,
    crop: Option<&str>,
    stage: Option<&str>,
    image: &[u8],
) -> AppResult<(CropKind, RipenessLabel, Option<StageDetection>)> {
    let crop = crop.map(str::parse::<CropKind>).transpose()?;
    let stage = stage.map(str::parse::<RipenessLabel>).transpose()?;

    if let (Some(crop), Some(stage)) = (crop, stage) {
        return Ok((crop, stage, None));
    }

    let classifier = classifier.ok_or(AppError::ClassifierUnavailable)?;
    let detection = classifier.classify(image).await?;
    Ok((
        crop.unwrap_or(detection.crop),
        stage.unwrap_or(detection.stage),
        Some(detection),
    ))
}

/// Run the full pipeline for one photo and soil test
pub async fn run_pipeline(state: &AppState, input: PipelineInput) -> AppResult<PipelineResult> {
    let PipelineInput {
        image: bytes,
        crop,
        stage,
        n_mgkg,
        p_mgkg,
        k_mgkg,
    } = input;

    let limits = state.config.images.clone();
    let (image, bytes, warning) = run_blocking(move || {
        let image = decode_image(&bytes)?;
        let warning = quality_check(&image, &limits);
        Ok((image, bytes, warning))
    })
    .await?;

    let (crop, stage, detection) = resolve_stage(
        state.classifier.as_ref(),
        crop.as_deref(),
        stage.as_deref(),
        &bytes,
    )
    .await?;

    let fertilizer = state
        .fertilizer
        .recommend(FertilizerInput {
            crop,
            stage,
            n_mgkg,
            p_mgkg,
            k_mgkg,
        })
        .await?;

    let predictor = state.harvest.clone();
    let harvest = run_blocking(move || {
        predictor
            .predict(&image, crop, stage)
            .map_err(AppError::from)
    })
    .await?;

    tracing::info!(
        request_id = %harvest.request_id,
        %crop,
        %stage,
        sub_stage = %harvest.sub_stage,
        "Pipeline completed"
    );

    Ok(PipelineResult {
        request_id: harvest.request_id,
        crop,
        stage,
        detection,
        fertilizer,
        harvest,
        warnings: warning.into_iter().collect(),
    })
}
