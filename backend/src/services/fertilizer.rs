//! Fertilizer recommendation service
//!
//! Product recommendations come from a CSV rule table keyed by crop and
//! stage, falling back to per-stage defaults. When the nutrient priority
//! model is configured the response also names the nutrient to increase.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use shared::{
    prioritize, stage_default_product, AgronomicDefaults, CropKind, FertilizerProduct, Nutrient,
    NutrientActions, NutrientScores, ProductSource, RipenessLabel, SoilNutrients,
};
use validator::{Validate, ValidationError};

use crate::error::{AppError, AppResult};
use crate::external::nutrient_priority::{NutrientPriorityClient, NutrientPriorityRequest};

/// One row of the rules CSV
#[derive(Debug, Clone, Deserialize)]
struct RuleRow {
    crop: String,
    stage: String,
    recommended_fertilizer: String,
    dose: String,
    reason: String,
}

/// A loaded fertilizer rule
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FertilizerRule {
    pub crop: CropKind,
    pub stage: RipenessLabel,
    #[serde(flatten)]
    pub product: FertilizerProduct,
}

impl TryFrom<RuleRow> for FertilizerRule {
    type Error = AppError;

    fn try_from(row: RuleRow) -> Result<Self, Self::Error> {
        Ok(FertilizerRule {
            crop: row.crop.parse()?,
            stage: row.stage.parse()?,
            product: FertilizerProduct {
                fertilizer: row.recommended_fertilizer.trim().to_string(),
                dose: row.dose.trim().to_string(),
                reason: row.reason.trim().to_string(),
            },
        })
    }
}

/// Fertilizer rules keyed by (crop, stage)
#[derive(Debug, Clone, Default)]
pub struct FertilizerRules {
    rules: HashMap<(CropKind, RipenessLabel), FertilizerRule>,
}

impl FertilizerRules {
    /// Load rules from a CSV file. A missing file yields an empty rule set.
    pub fn load(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::warn!(
                "Fertilizer rules file {} not found; using stage defaults only",
                path.display()
            );
            return Ok(Self::default());
        }

        let reader = csv::Reader::from_path(path).map_err(|e| {
            AppError::Configuration(format!("Cannot open {}: {}", path.display(), e))
        })?;
        let rules = Self::from_reader(reader);
        tracing::info!("Loaded {} fertilizer rules from {}", rules.len(), path.display());
        Ok(rules)
    }

    /// Parse rules from CSV text with a header row
    pub fn from_csv_str(data: &str) -> Self {
        Self::from_reader(csv::Reader::from_reader(data.as_bytes()))
    }

    fn from_reader<R: std::io::Read>(mut reader: csv::Reader<R>) -> Self {
        let mut rules = HashMap::new();
        for (line, record) in reader.deserialize::<RuleRow>().enumerate() {
            let parsed = record
                .map_err(|e| AppError::ValidationError(e.to_string()))
                .and_then(FertilizerRule::try_from);
            match parsed {
                Ok(rule) => {
                    rules.insert((rule.crop, rule.stage), rule);
                }
                Err(e) => tracing::warn!("Skipping fertilizer rule row {}: {}", line + 1, e),
            }
        }
        Self { rules }
    }

    pub fn get(&self, crop: CropKind, stage: RipenessLabel) -> Option<&FertilizerRule> {
        self.rules.get(&(crop, stage))
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// All rules ordered by crop then stage
    pub fn sorted(&self) -> Vec<FertilizerRule> {
        let mut rules: Vec<FertilizerRule> = self.rules.values().cloned().collect();
        rules.sort_by_key(|r| (r.crop.as_str(), r.stage.as_str()));
        rules
    }

    /// Product for a crop and stage, with where it came from
    pub fn product_for(&self, crop: CropKind, stage: RipenessLabel) -> (FertilizerProduct, ProductSource) {
        match self.get(crop, stage) {
            Some(rule) => (rule.product.clone(), ProductSource::Rules),
            None => (stage_default_product(stage), ProductSource::StageDefault),
        }
    }
}

fn validate_reading(mgkg: f64) -> Result<(), ValidationError> {
    shared::validate_nutrient_reading(mgkg).map_err(|msg| {
        let mut err = ValidationError::new("nutrient_reading");
        err.message = Some(msg.into());
        err
    })
}

/// Input for a fertilizer recommendation
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct FertilizerInput {
    pub crop: CropKind,
    pub stage: RipenessLabel,
    #[serde(alias = "N_mgkg")]
    #[validate(custom = "validate_reading")]
    pub n_mgkg: f64,
    #[serde(alias = "P_mgkg")]
    #[validate(custom = "validate_reading")]
    pub p_mgkg: f64,
    #[serde(alias = "K_mgkg")]
    #[validate(custom = "validate_reading")]
    pub k_mgkg: f64,
}

impl FertilizerInput {
    pub fn soil(&self) -> SoilNutrients {
        SoilNutrients {
            n_mgkg: self.n_mgkg,
            p_mgkg: self.p_mgkg,
            k_mgkg: self.k_mgkg,
        }
    }
}

/// Fertilizer recommendation result
#[derive(Debug, Clone, Serialize)]
pub struct FertilizerRecommendation {
    pub crop: CropKind,
    pub stage: RipenessLabel,
    pub soil: SoilNutrients,
    pub used_defaults: AgronomicDefaults,
    pub recommendation: FertilizerProduct,
    pub source: ProductSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority_scores: Option<NutrientScores>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority_nutrient: Option<Nutrient>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nutrient_actions: Option<NutrientActions>,
}

/// Fertilizer recommendation service
pub struct FertilizerService {
    rules: FertilizerRules,
    nutrient_client: Option<NutrientPriorityClient>,
    defaults: AgronomicDefaults,
}

impl FertilizerService {
    pub fn new(rules: FertilizerRules, nutrient_client: Option<NutrientPriorityClient>) -> Self {
        Self {
            rules,
            nutrient_client,
            defaults: AgronomicDefaults::default(),
        }
    }

    pub fn rules(&self) -> &FertilizerRules {
        &self.rules
    }

    pub fn has_priority_model(&self) -> bool {
        self.nutrient_client.is_some()
    }

    /// Recommend a product and, when available, the priority nutrient
    pub async fn recommend(&self, input: FertilizerInput) -> AppResult<FertilizerRecommendation> {
        input.validate()?;

        let soil = input.soil();
        let (recommendation, source) = self.rules.product_for(input.crop, input.stage);

        let mut result = FertilizerRecommendation {
            crop: input.crop,
            stage: input.stage,
            soil,
            used_defaults: self.defaults.clone(),
            recommendation,
            source,
            priority_scores: None,
            priority_nutrient: None,
            nutrient_actions: None,
        };

        if let Some(client) = &self.nutrient_client {
            let request = NutrientPriorityRequest {
                crop: input.crop,
                stage: input.stage,
                soil,
                defaults: &self.defaults,
            };
            let scores = client.score(&request).await?;
            let priority = prioritize(&scores).ok_or_else(|| {
                AppError::NutrientModelError("model returned no finite scores".to_string())
            })?;

            tracing::info!(
                crop = %input.crop,
                stage = %input.stage,
                priority = ?priority.priority_nutrient,
                "Nutrient priority computed"
            );

            result.priority_scores = Some(scores);
            result.priority_nutrient = Some(priority.priority_nutrient);
            result.nutrient_actions = Some(priority.fertilizer_recommendation);
        }

        Ok(result)
    }
}
