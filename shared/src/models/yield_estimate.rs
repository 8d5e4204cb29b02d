//! Formula-driven yield estimation

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use validator::{Validate, ValidationError};

use super::CropKind;

/// Errors raised by the yield estimator
#[derive(Error, Debug, Clone, PartialEq)]
pub enum YieldError {
    #[error("Invalid {field}: {message}")]
    InvalidInput { field: String, message: String },
}

/// Farmer-reported productivity of the field
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ProductivityLevel {
    Low,
    Medium,
    High,
}

impl ProductivityLevel {
    pub fn factor(&self) -> Decimal {
        match self {
            ProductivityLevel::Low => Decimal::new(7, 1),
            ProductivityLevel::Medium => Decimal::new(9, 1),
            ProductivityLevel::High => Decimal::new(11, 1),
        }
    }
}

impl std::str::FromStr for ProductivityLevel {
    type Err = YieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(ProductivityLevel::Low),
            "medium" => Ok(ProductivityLevel::Medium),
            "high" => Ok(ProductivityLevel::High),
            other => Err(YieldError::InvalidInput {
                field: "productivity_level".to_string(),
                message: format!("unknown productivity level '{}'", other),
            }),
        }
    }
}

/// Average yield per hectare in tons
pub fn base_yield_tons_per_hectare(crop: CropKind) -> Decimal {
    match crop {
        CropKind::Tomato => Decimal::from(65),
        CropKind::Banana => Decimal::from(40),
        CropKind::Mango => Decimal::from(15),
        CropKind::Papaya => Decimal::from(50),
    }
}

/// Soil pH factor: optimal 6.0-7.0, tolerable 5.5-7.5
pub fn soil_ph_factor(soil_ph: Decimal) -> Decimal {
    if soil_ph >= Decimal::new(60, 1) && soil_ph <= Decimal::new(70, 1) {
        Decimal::ONE
    } else if soil_ph >= Decimal::new(55, 1) && soil_ph <= Decimal::new(75, 1) {
        Decimal::new(9, 1)
    } else {
        Decimal::new(75, 2)
    }
}

/// Planted fraction of the recommended density, capped at 1
pub fn plant_density_factor(number_of_plants: u32, area_hectares: Decimal) -> Decimal {
    let capacity = area_hectares * Decimal::from(10_000);
    if capacity <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    Decimal::from(number_of_plants)
        .checked_div(capacity)
        .map_or(Decimal::ONE, |fraction| fraction.min(Decimal::ONE))
}

fn validate_area(area: &Decimal) -> Result<(), ValidationError> {
    crate::validation::validate_area_hectares(*area).map_err(|msg| {
        let mut err = ValidationError::new("area_hectares");
        err.message = Some(msg.into());
        err
    })
}

fn validate_ph(ph: &Decimal) -> Result<(), ValidationError> {
    crate::validation::validate_soil_ph(*ph).map_err(|msg| {
        let mut err = ValidationError::new("soil_ph");
        err.message = Some(msg.into());
        err
    })
}

/// Manual yield estimate request
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct YieldEstimateInput {
    pub crop: CropKind,
    #[validate(custom = "validate_area")]
    pub area_hectares: Decimal,
    pub number_of_plants: u32,
    #[validate(custom = "validate_ph")]
    pub soil_ph: Decimal,
    pub productivity_level: ProductivityLevel,
}

/// Factors applied (or reported) by the estimator
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct YieldFactors {
    pub base_yield_tons_per_hectare: Decimal,
    pub productivity_factor: Decimal,
    pub soil_ph_factor: Decimal,
    /// Reported only; does not scale the estimate
    pub plant_density_factor: Decimal,
}

/// Yield estimate
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct YieldEstimate {
    pub crop: CropKind,
    pub area_hectares: Decimal,
    pub number_of_plants: u32,
    pub estimated_yield_kg: Decimal,
    pub estimated_yield_tons: Decimal,
    pub productivity_level: ProductivityLevel,
    pub soil_ph: Decimal,
    pub factors: YieldFactors,
}

/// Estimate yield as base × area × productivity × pH factor
pub fn estimate_yield(input: &YieldEstimateInput) -> Result<YieldEstimate, YieldError> {
    input.validate().map_err(|errors| {
        let (field, message) = errors
            .field_errors()
            .into_iter()
            .next()
            .map(|(field, errs)| {
                let message = errs
                    .first()
                    .and_then(|e| e.message.as_ref())
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| "invalid value".to_string());
                (field.to_string(), message)
            })
            .unwrap_or_else(|| ("input".to_string(), "invalid value".to_string()));
        YieldError::InvalidInput { field, message }
    })?;

    let factors = YieldFactors {
        base_yield_tons_per_hectare: base_yield_tons_per_hectare(input.crop),
        productivity_factor: input.productivity_level.factor(),
        soil_ph_factor: soil_ph_factor(input.soil_ph),
        plant_density_factor: plant_density_factor(input.number_of_plants, input.area_hectares)
            .round_dp(4),
    };

    let yield_tons = factors.base_yield_tons_per_hectare
        * input.area_hectares
        * factors.productivity_factor
        * factors.soil_ph_factor;
    let yield_kg = yield_tons * Decimal::from(1000);

    Ok(YieldEstimate {
        crop: input.crop,
        area_hectares: input.area_hectares,
        number_of_plants: input.number_of_plants,
        estimated_yield_kg: yield_kg.round_dp(2),
        estimated_yield_tons: yield_tons.round_dp(2),
        productivity_level: input.productivity_level,
        soil_ph: input.soil_ph,
        factors,
    })
}
