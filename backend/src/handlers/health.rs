//! Health check handlers

use axum::{extract::State, Json};
use serde::Serialize;

use crate::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub classifier: bool,
    pub nutrient_model: bool,
    pub harvest_ensemble: bool,
    pub fertilizer_rules: usize,
}

/// Health check endpoint handler
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        classifier: state.classifier.is_some(),
        nutrient_model: state.fertilizer.has_priority_model(),
        harvest_ensemble: state.harvest.has_ensemble(),
        fertilizer_rules: state.fertilizer.rules().len(),
    })
}
