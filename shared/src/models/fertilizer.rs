//! Fertilizer recommendation models

use serde::{Deserialize, Serialize};

use super::RipenessLabel;

/// Soil macro-nutrient readings from a soil test (mg/kg)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SoilNutrients {
    #[serde(rename = "N_mgkg")]
    pub n_mgkg: f64,
    #[serde(rename = "P_mgkg")]
    pub p_mgkg: f64,
    #[serde(rename = "K_mgkg")]
    pub k_mgkg: f64,
}

/// Agronomic conditions assumed when only soil NPK is known
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AgronomicDefaults {
    pub temperature: f64,
    pub humidity: f64,
    pub soil_moisture: f64,
    pub irrigation_type: String,
    pub crop_age_days: u32,
    pub plant_spacing_cm: u32,
    pub yield_target_ton_acre: u32,
    #[serde(rename = "soil_PH")]
    pub soil_ph: f64,
}

impl Default for AgronomicDefaults {
    fn default() -> Self {
        Self {
            temperature: 28.0,
            humidity: 65.0,
            soil_moisture: 40.0,
            irrigation_type: "drip".to_string(),
            crop_age_days: 45,
            plant_spacing_cm: 45,
            yield_target_ton_acre: 20,
            soil_ph: 6.5,
        }
    }
}

/// Macro-nutrient
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Nutrient {
    N,
    P,
    K,
}

impl std::fmt::Display for Nutrient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Nutrient::N => write!(f, "Nitrogen (N)"),
            Nutrient::P => write!(f, "Phosphorus (P)"),
            Nutrient::K => write!(f, "Potassium (K)"),
        }
    }
}

/// Per-nutrient deficiency scores from the priority models
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct NutrientScores {
    #[serde(rename = "N")]
    pub n: f64,
    #[serde(rename = "P")]
    pub p: f64,
    #[serde(rename = "K")]
    pub k: f64,
}

impl NutrientScores {
    pub fn get(&self, nutrient: Nutrient) -> f64 {
        match nutrient {
            Nutrient::N => self.n,
            Nutrient::P => self.p,
            Nutrient::K => self.k,
        }
    }
}

/// What to do with a nutrient
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum NutrientAction {
    Increase,
    Normal,
}

/// Per-nutrient actions
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct NutrientActions {
    #[serde(rename = "Nitrogen (N)")]
    pub nitrogen: NutrientAction,
    #[serde(rename = "Phosphorus (P)")]
    pub phosphorus: NutrientAction,
    #[serde(rename = "Potassium (K)")]
    pub potassium: NutrientAction,
}

/// Outcome of nutrient prioritisation
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct NutrientPriority {
    pub priority_nutrient: Nutrient,
    pub fertilizer_recommendation: NutrientActions,
}

/// Pick the nutrient with the highest score and mark it for increase.
///
/// Ties resolve in the order N, P, K. Non-finite scores are ignored;
/// returns `None` when no score is finite.
pub fn prioritize(scores: &NutrientScores) -> Option<NutrientPriority> {
    let mut best: Option<(Nutrient, f64)> = None;
    for nutrient in [Nutrient::N, Nutrient::P, Nutrient::K] {
        let score = scores.get(nutrient);
        if !score.is_finite() {
            continue;
        }
        match best {
            Some((_, top)) if score <= top => {}
            _ => best = Some((nutrient, score)),
        }
    }

    let (priority, _) = best?;
    let action = |n: Nutrient| {
        if n == priority {
            NutrientAction::Increase
        } else {
            NutrientAction::Normal
        }
    };

    Some(NutrientPriority {
        priority_nutrient: priority,
        fertilizer_recommendation: NutrientActions {
            nitrogen: action(Nutrient::N),
            phosphorus: action(Nutrient::P),
            potassium: action(Nutrient::K),
        },
    })
}

/// A concrete fertilizer product recommendation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FertilizerProduct {
    pub fertilizer: String,
    pub dose: String,
    pub reason: String,
}

/// Product used when no rule matches the crop and stage
pub fn stage_default_product(stage: RipenessLabel) -> FertilizerProduct {
    let (fertilizer, dose, reason) = match stage {
        RipenessLabel::Unripe => ("Urea", "40 kg/acre", "Promote vegetative growth"),
        RipenessLabel::Semiripe => ("NPK", "25 kg/acre", "Support fruit formation"),
        RipenessLabel::Ripe => ("MOP", "20 kg/acre", "Enhance color & firmness"),
    };
    FertilizerProduct {
        fertilizer: fertilizer.to_string(),
        dose: dose.to_string(),
        reason: reason.to_string(),
    }
}

/// Where a product recommendation came from
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ProductSource {
    Rules,
    StageDefault,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prioritize_picks_highest() {
        let scores = NutrientScores {
            n: 0.2,
            p: 0.7,
            k: 0.4,
        };
        let priority = prioritize(&scores).unwrap();
        assert_eq!(priority.priority_nutrient, Nutrient::P);
        assert_eq!(priority.fertilizer_recommendation.phosphorus, NutrientAction::Increase);
        assert_eq!(priority.fertilizer_recommendation.nitrogen, NutrientAction::Normal);
        assert_eq!(priority.fertilizer_recommendation.potassium, NutrientAction::Normal);
    }

    #[test]
    fn test_prioritize_ties_prefer_nitrogen() {
        let scores = NutrientScores {
            n: 0.5,
            p: 0.5,
            k: 0.5,
        };
        assert_eq!(prioritize(&scores).unwrap().priority_nutrient, Nutrient::N);
    }

    #[test]
    fn test_prioritize_skips_nan() {
        let scores = NutrientScores {
            n: f64::NAN,
            p: 0.1,
            k: 0.3,
        };
        assert_eq!(prioritize(&scores).unwrap().priority_nutrient, Nutrient::K);

        let all_nan = NutrientScores {
            n: f64::NAN,
            p: f64::NAN,
            k: f64::INFINITY,
        };
        assert!(prioritize(&all_nan).is_none());
    }

    #[test]
    fn test_actions_serialize_with_display_names() {
        let priority = prioritize(&NutrientScores { n: 1.0, p: 0.0, k: 0.0 }).unwrap();
        let json = serde_json::to_value(priority).unwrap();
        assert_eq!(json["priority_nutrient"], "N");
        assert_eq!(json["fertilizer_recommendation"]["Nitrogen (N)"], "Increase");
        assert_eq!(json["fertilizer_recommendation"]["Potassium (K)"], "Normal");
    }

    #[test]
    fn test_stage_defaults() {
        assert_eq!(stage_default_product(RipenessLabel::Unripe).fertilizer, "Urea");
        assert_eq!(stage_default_product(RipenessLabel::Semiripe).dose, "25 kg/acre");
        assert_eq!(stage_default_product(RipenessLabel::Ripe).fertilizer, "MOP");
    }
}
