//! HTTP handler for yield estimation

use axum::Json;
use shared::{estimate_yield, YieldEstimate, YieldEstimateInput};

use super::json::AppJson;
use crate::error::AppResult;

/// Estimate crop yield from area, soil pH and productivity
pub async fn estimate_crop_yield(
    AppJson(input): AppJson<YieldEstimateInput>,
) -> AppResult<Json<YieldEstimate>> {
    let estimate = estimate_yield(&input)?;
    tracing::debug!(
        crop = %estimate.crop,
        tons = %estimate.estimated_yield_tons,
        "Yield estimated"
    );
    Ok(Json(estimate))
}
