//! Validation utilities for AgriTriFusion inputs

use rust_decimal::Decimal;

// ============================================================================
// Field Validations
// ============================================================================

/// Validate cultivated area is positive and below a sanity ceiling
pub fn validate_area_hectares(area: Decimal) -> Result<(), &'static str> {
    if area <= Decimal::ZERO {
        return Err("Area must be greater than zero");
    }
    if area > Decimal::from(100_000) {
        return Err("Area exceeds 100,000 hectares");
    }
    Ok(())
}

/// Validate soil pH is on the 0-14 scale
pub fn validate_soil_ph(ph: Decimal) -> Result<(), &'static str> {
    if ph < Decimal::ZERO || ph > Decimal::from(14) {
        return Err("Soil pH must be between 0 and 14");
    }
    Ok(())
}

/// Validate a soil nutrient reading in mg/kg
pub fn validate_nutrient_reading(mgkg: f64) -> Result<(), &'static str> {
    if !mgkg.is_finite() {
        return Err("Nutrient reading must be a finite number");
    }
    if mgkg < 0.0 {
        return Err("Nutrient reading cannot be negative");
    }
    Ok(())
}

/// Validate a classifier confidence percentage
pub fn validate_confidence_percent(confidence: f64) -> Result<(), &'static str> {
    if !(0.0..=100.0).contains(&confidence) {
        return Err("Confidence must be between 0 and 100");
    }
    Ok(())
}

// ============================================================================
// Image Checks
// ============================================================================

/// Check an image meets the minimum resolution for reliable descriptors
pub fn meets_minimum_size(width: u32, height: u32, min_width: u32, min_height: u32) -> bool {
    width >= min_width && height >= min_height
}

/// Check whether soil pH is in the optimal band for the supported crops
pub fn is_optimal_soil_ph(ph: Decimal) -> bool {
    ph >= Decimal::new(60, 1) && ph <= Decimal::new(70, 1)
}
