//! Prediction and recommendation services for the AgriTriFusion server

pub mod feature_extraction;
pub mod fertilizer;
pub mod harvest_prediction;
pub mod pipeline;

pub use fertilizer::{FertilizerRules, FertilizerService};
pub use harvest_prediction::HarvestPredictor;

use crate::error::{AppError, AppResult};

/// Run CPU-bound work (image decoding, descriptor extraction) off the async workers
pub async fn run_blocking<T, F>(work: F) -> AppResult<T>
where
    F: FnOnce() -> AppResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| AppError::Internal(format!("Worker task failed: {}", e)))?
}
