//! WebAssembly module for AgriTriFusion
//!
//! Provides client-side computation for:
//! - Sub-stage classification from precomputed descriptors
//! - Rule-based harvest windows
//! - Yield estimates
//! - Nutrient prioritisation and stage default fertilizers

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use wasm_bindgen::prelude::*;

// Re-export shared types for use in JavaScript
pub use shared::models::*;
pub use shared::types::*;
pub use shared::validation::*;

/// Initialize the WASM module
#[wasm_bindgen(start)]
pub fn init() {
    web_sys::console::log_1(&JsValue::from_str("AgriTriFusion WASM module loaded"));
}

fn to_js(err: String) -> JsValue {
    web_sys::console::warn_1(&JsValue::from_str(&err));
    JsValue::from_str(&err)
}

fn to_json<T: Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string(value).map_err(|e| format!("Serialization failed: {}", e))
}

fn parse_labels(crop: &str, stage: &str) -> Result<(CropKind, RipenessLabel), String> {
    let crop = crop.parse::<CropKind>().map_err(|e| e.to_string())?;
    let stage = stage.parse::<RipenessLabel>().map_err(|e| e.to_string())?;
    Ok((crop, stage))
}

fn sub_stage_for(crop: &str, stage: &str, features_json: &str) -> Result<String, String> {
    let (crop, stage) = parse_labels(crop, stage)?;
    let features: VisualFeatures = serde_json::from_str(features_json)
        .map_err(|e| format!("Invalid features JSON: {}", e))?;
    Ok(classify_sub_stage(&features, crop, stage).to_string())
}

#[derive(Serialize)]
struct RuleBasedWindow {
    sub_stage: SubStageLabel,
    base_days: f64,
    #[serde(flatten)]
    window: HarvestWindow,
}

fn window_for(
    crop: &str,
    stage: &str,
    features_json: &str,
    now: DateTime<Utc>,
) -> Result<String, String> {
    let (crop, stage) = parse_labels(crop, stage)?;
    let features: VisualFeatures = serde_json::from_str(features_json)
        .map_err(|e| format!("Invalid features JSON: {}", e))?;

    let sub_stage = classify_sub_stage(&features, crop, stage);
    let base_days = BaseHarvestDaysTable::standard().lookup(HarvestKey::new(crop, stage, sub_stage));
    let (earliest, expected, latest) = rule_based_days(base_days);
    let window = HarvestWindow::from_day_counts(earliest, expected, latest, now)
        .map_err(|e| e.to_string())?;

    to_json(&RuleBasedWindow {
        sub_stage,
        base_days,
        window,
    })
}

fn yield_for(
    crop: &str,
    area_hectares: f64,
    number_of_plants: u32,
    soil_ph: f64,
    productivity_level: &str,
) -> Result<String, String> {
    let input = YieldEstimateInput {
        crop: crop.parse::<CropKind>().map_err(|e| e.to_string())?,
        area_hectares: Decimal::try_from(area_hectares)
            .map_err(|_| "Area must be a finite number".to_string())?,
        number_of_plants,
        soil_ph: Decimal::try_from(soil_ph)
            .map_err(|_| "Soil pH must be a finite number".to_string())?,
        productivity_level: productivity_level
            .parse::<ProductivityLevel>()
            .map_err(|e| e.to_string())?,
    };
    let estimate = estimate_yield(&input).map_err(|e| e.to_string())?;
    to_json(&estimate)
}

fn priority_for(n: f64, p: f64, k: f64) -> Result<String, String> {
    let priority = prioritize(&NutrientScores { n, p, k })
        .ok_or_else(|| "No finite nutrient score".to_string())?;
    to_json(&priority)
}

/// Classify the sub-stage from descriptors computed elsewhere
#[wasm_bindgen]
pub fn classify_sub_stage_label(
    crop: &str,
    stage: &str,
    features_json: &str,
) -> Result<String, JsValue> {
    sub_stage_for(crop, stage, features_json).map_err(to_js)
}

/// Rule-based harvest window relative to the browser clock
#[wasm_bindgen]
pub fn rule_based_harvest_window(
    crop: &str,
    stage: &str,
    features_json: &str,
) -> Result<String, JsValue> {
    let now = DateTime::<Utc>::from_timestamp_millis(js_sys::Date::now() as i64)
        .ok_or_else(|| to_js("Browser clock out of range".to_string()))?;
    window_for(crop, stage, features_json, now).map_err(to_js)
}

/// Estimate yield in tons and kilograms
#[wasm_bindgen]
pub fn estimate_crop_yield(
    crop: &str,
    area_hectares: f64,
    number_of_plants: u32,
    soil_ph: f64,
    productivity_level: &str,
) -> Result<String, JsValue> {
    yield_for(crop, area_hectares, number_of_plants, soil_ph, productivity_level).map_err(to_js)
}

/// Pick the nutrient to increase from model scores
#[wasm_bindgen]
pub fn prioritize_nutrients(n: f64, p: f64, k: f64) -> Result<String, JsValue> {
    priority_for(n, p, k).map_err(to_js)
}

/// Default fertilizer for a ripeness stage
#[wasm_bindgen]
pub fn default_fertilizer(stage: &str) -> Result<String, JsValue> {
    stage
        .parse::<RipenessLabel>()
        .map_err(|e| e.to_string())
        .and_then(|stage| to_json(&stage_default_product(stage)))
        .map_err(to_js)
}

/// Check soil pH is in the optimal band
#[wasm_bindgen]
pub fn is_optimal_ph(soil_ph: f64) -> bool {
    Decimal::try_from(soil_ph)
        .map(is_optimal_soil_ph)
        .unwrap_or(false)
}
