//! Route definitions for the AgriTriFusion API

use axum::{
    routing::{get, post},
    Router,
};

use crate::{handlers, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/stage", post(handlers::detect_stage))
        .nest("/harvest", harvest_routes())
        .nest("/fertilizer", fertilizer_routes())
        .nest("/yield", yield_routes())
        .route("/pipeline", post(handlers::run_full_pipeline))
}

/// Harvest window routes
fn harvest_routes() -> Router<AppState> {
    Router::new().route("/predict", post(handlers::predict_harvest))
}

/// Fertilizer recommendation routes
fn fertilizer_routes() -> Router<AppState> {
    Router::new()
        .route("/recommend", post(handlers::recommend_fertilizer))
        .route("/rules", get(handlers::list_fertilizer_rules))
}

/// Yield estimation routes
fn yield_routes() -> Router<AppState> {
    Router::new().route("/estimate", post(handlers::estimate_crop_yield))
}
