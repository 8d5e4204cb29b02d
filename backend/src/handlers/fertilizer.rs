//! HTTP handlers for fertilizer recommendations

use axum::{extract::State, Json};

use super::json::AppJson;
use crate::error::AppResult;
use crate::services::fertilizer::{FertilizerInput, FertilizerRecommendation, FertilizerRule};
use crate::AppState;

/// Recommend a fertilizer for a crop, stage and soil test
pub async fn recommend_fertilizer(
    State(state): State<AppState>,
    AppJson(input): AppJson<FertilizerInput>,
) -> AppResult<Json<FertilizerRecommendation>> {
    let recommendation = state.fertilizer.recommend(input).await?;
    Ok(Json(recommendation))
}

/// List the loaded fertilizer rules
pub async fn list_fertilizer_rules(State(state): State<AppState>) -> Json<Vec<FertilizerRule>> {
    Json(state.fertilizer.rules().sorted())
}
