//! Harvest window prediction
//!
//! Combines visual descriptors, the sub-stage rules and the base days table.
//! An ensemble of day-count estimators can be injected; without one the
//! window is derived from the table with a ±20% spread.

use chrono::{DateTime, Utc};
use image::RgbImage;
use serde::Serialize;
use shared::{
    classify_sub_stage, round2, rule_based_days, BaseHarvestDaysTable, CropKind, FeatureEncoders,
    HarvestKey, HarvestWindow, PredictionError, RipenessLabel, SubStageLabel, VisualFeatures,
    WindowSource,
};
use uuid::Uuid;

use super::feature_extraction::extract_visual_features;

/// A single trained day-count estimator
pub trait DayEstimator: Send + Sync {
    /// Predict days to harvest from an encoded feature vector
    fn predict(&self, features: &[f64]) -> f64;
}

impl<F> DayEstimator for F
where
    F: Fn(&[f64]) -> f64 + Send + Sync,
{
    fn predict(&self, features: &[f64]) -> f64 {
        self(features)
    }
}

/// Independent estimators aggregated as min / mean / max
pub struct HarvestEnsemble {
    estimators: Vec<Box<dyn DayEstimator>>,
    encoders: FeatureEncoders,
}

impl std::fmt::Debug for HarvestEnsemble {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HarvestEnsemble")
            .field("estimators", &self.estimators.len())
            .field("encoders", &self.encoders)
            .finish()
    }
}

impl HarvestEnsemble {
    /// Ensemble with encoders fitted on every label
    pub fn new(estimators: Vec<Box<dyn DayEstimator>>) -> Result<Self, PredictionError> {
        Self::with_encoders(estimators, FeatureEncoders::default())
    }

    /// Ensemble with the encoders its estimators were trained with
    pub fn with_encoders(
        estimators: Vec<Box<dyn DayEstimator>>,
        encoders: FeatureEncoders,
    ) -> Result<Self, PredictionError> {
        if estimators.is_empty() {
            return Err(PredictionError::Ensemble(
                "ensemble needs at least one estimator".to_string(),
            ));
        }
        Ok(Self {
            estimators,
            encoders,
        })
    }

    /// Evaluate every estimator and return ordered (earliest, expected, latest)
    pub fn window_days(
        &self,
        crop: CropKind,
        stage: RipenessLabel,
        sub_stage: SubStageLabel,
        features: &VisualFeatures,
    ) -> Result<(f64, f64, f64), PredictionError> {
        let vector = self
            .encoders
            .feature_vector(crop, stage, sub_stage, features)?;

        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        let mut sum = 0.0;
        for (i, estimator) in self.estimators.iter().enumerate() {
            let days = estimator.predict(&vector);
            if !days.is_finite() {
                return Err(PredictionError::Ensemble(format!(
                    "estimator {} returned a non-finite day count",
                    i
                )));
            }
            let days = days.max(0.0);
            min = min.min(days);
            max = max.max(days);
            sum += days;
        }
        let mean = sum / self.estimators.len() as f64;

        // Float mean can drift past the bounds by an ulp
        let mut ordered = [min, mean, max];
        ordered.sort_by(f64::total_cmp);
        Ok((ordered[0], ordered[1], ordered[2]))
    }
}

/// Full harvest prediction for one image
#[derive(Debug, Clone, Serialize)]
pub struct HarvestPrediction {
    pub request_id: Uuid,
    pub crop: CropKind,
    pub stage: RipenessLabel,
    pub sub_stage: SubStageLabel,
    pub base_days: f64,
    pub features: VisualFeatures,
    pub source: WindowSource,
    pub evaluated_at: DateTime<Utc>,
    #[serde(flatten)]
    pub window: HarvestWindow,
}

/// Harvest window predictor. Read-only once built and shared across requests.
#[derive(Debug)]
pub struct HarvestPredictor {
    table: BaseHarvestDaysTable,
    ensemble: Option<HarvestEnsemble>,
}

impl Default for HarvestPredictor {
    fn default() -> Self {
        Self::new(BaseHarvestDaysTable::default())
    }
}

impl HarvestPredictor {
    /// Rule-based predictor over the given table
    pub fn new(table: BaseHarvestDaysTable) -> Self {
        Self {
            table,
            ensemble: None,
        }
    }

    pub fn with_ensemble(mut self, ensemble: HarvestEnsemble) -> Self {
        self.ensemble = Some(ensemble);
        self
    }

    pub fn has_ensemble(&self) -> bool {
        self.ensemble.is_some()
    }

    /// Predict relative to the current instant
    pub fn predict(
        &self,
        image: &RgbImage,
        crop: CropKind,
        stage: RipenessLabel,
    ) -> Result<HarvestPrediction, PredictionError> {
        self.predict_at(image, crop, stage, Utc::now())
    }

    /// Predict relative to an explicit evaluation instant
    pub fn predict_at(
        &self,
        image: &RgbImage,
        crop: CropKind,
        stage: RipenessLabel,
        now: DateTime<Utc>,
    ) -> Result<HarvestPrediction, PredictionError> {
        let features = extract_visual_features(image)?;
        self.predict_from_features(features, crop, stage, now)
    }

    /// Predict from precomputed descriptors
    pub fn predict_from_features(
        &self,
        features: VisualFeatures,
        crop: CropKind,
        stage: RipenessLabel,
        now: DateTime<Utc>,
    ) -> Result<HarvestPrediction, PredictionError> {
        let sub_stage = classify_sub_stage(&features, crop, stage);
        let key = HarvestKey::new(crop, stage, sub_stage);
        let base_days = self.table.lookup(key);

        let (source, (earliest, expected, latest)) = match &self.ensemble {
            Some(ensemble) => (
                WindowSource::Ensemble,
                ensemble.window_days(crop, stage, sub_stage, &features)?,
            ),
            None => (WindowSource::RuleBased, rule_based_days(base_days)),
        };

        let window = HarvestWindow::from_day_counts(earliest, expected, latest, now)?;

        tracing::info!(
            %key,
            base_days,
            source = ?source,
            expected_days = window.days.expected,
            "Predicted harvest window"
        );

        Ok(HarvestPrediction {
            request_id: Uuid::new_v4(),
            crop,
            stage,
            sub_stage,
            base_days: round2(base_days),
            features,
            source,
            evaluated_at: now,
            window,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use image::Rgb;
    use shared::LabelEncoder;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap()
    }

    fn red_image() -> RgbImage {
        RgbImage::from_pixel(32, 32, Rgb([200, 30, 20]))
    }

    fn constant(days: f64) -> Box<dyn DayEstimator> {
        Box::new(move |_: &[f64]| days)
    }

    #[test]
    fn test_tomato_ripe_rule_based() {
        let predictor = HarvestPredictor::default();
        let prediction = predictor
            .predict_at(&red_image(), CropKind::Tomato, RipenessLabel::Ripe, fixed_now())
            .unwrap();

        assert_eq!(prediction.sub_stage, SubStageLabel::Late);
        assert_eq!(prediction.base_days, 0.1);
        assert_eq!(prediction.source, WindowSource::RuleBased);
        assert_eq!(prediction.window.days.earliest, 0.08);
        assert_eq!(prediction.window.days.expected, 0.1);
        assert_eq!(prediction.window.days.latest, 0.12);
        assert_eq!(prediction.window.dates.expected.to_string(), "2024-03-01");
    }

    #[test]
    fn test_same_inputs_same_days() {
        let predictor = HarvestPredictor::default();
        let image = red_image();
        let now = fixed_now();
        let first = predictor
            .predict_at(&image, CropKind::Mango, RipenessLabel::Unripe, now)
            .unwrap();
        let second = predictor
            .predict_at(&image, CropKind::Mango, RipenessLabel::Unripe, now)
            .unwrap();
        assert_eq!(first.window, second.window);
        assert_eq!(first.sub_stage, second.sub_stage);
    }

    #[test]
    fn test_ensemble_min_mean_max() {
        let ensemble =
            HarvestEnsemble::new(vec![constant(4.0), constant(1.0), constant(2.5)]).unwrap();
        let predictor = HarvestPredictor::default().with_ensemble(ensemble);
        let prediction = predictor
            .predict_at(&red_image(), CropKind::Banana, RipenessLabel::Unripe, fixed_now())
            .unwrap();

        assert_eq!(prediction.source, WindowSource::Ensemble);
        assert_eq!(prediction.window.days.earliest, 1.0);
        assert_eq!(prediction.window.days.expected, 2.5);
        assert_eq!(prediction.window.days.latest, 4.0);
        assert_eq!(prediction.window.dates.latest.to_string(), "2024-03-05");
    }

    #[test]
    fn test_ensemble_receives_encoded_vector() {
        let ensemble = HarvestEnsemble::new(vec![Box::new(|v: &[f64]| {
            assert_eq!(v.len(), shared::FEATURE_VECTOR_LEN);
            // crop index: tomato = 3
            v[0]
        }) as Box<dyn DayEstimator>])
        .unwrap();
        let predictor = HarvestPredictor::default().with_ensemble(ensemble);
        let prediction = predictor
            .predict_at(&red_image(), CropKind::Tomato, RipenessLabel::Semiripe, fixed_now())
            .unwrap();
        assert_eq!(prediction.window.days.expected, 3.0);
    }

    #[test]
    fn test_negative_outputs_are_clamped() {
        let ensemble = HarvestEnsemble::new(vec![constant(-2.0), constant(1.0)]).unwrap();
        let (e, x, l) = ensemble
            .window_days(
                CropKind::Papaya,
                RipenessLabel::Semiripe,
                SubStageLabel::Mid,
                &VisualFeatures::default(),
            )
            .unwrap();
        assert_eq!((e, x, l), (0.0, 0.5, 1.0));
        assert!(e <= x && x <= l);
    }

    #[test]
    fn test_non_finite_output_fails() {
        let ensemble = HarvestEnsemble::new(vec![constant(1.0), constant(f64::NAN)]).unwrap();
        let predictor = HarvestPredictor::default().with_ensemble(ensemble);
        let result =
            predictor.predict_at(&red_image(), CropKind::Tomato, RipenessLabel::Unripe, fixed_now());
        assert!(matches!(result, Err(PredictionError::Ensemble(_))));
    }

    #[test]
    fn test_unfitted_label_is_fatal() {
        let encoders = FeatureEncoders {
            crop: LabelEncoder::fit([CropKind::Tomato, CropKind::Banana]),
            ..FeatureEncoders::default()
        };
        let ensemble = HarvestEnsemble::with_encoders(vec![constant(2.0)], encoders).unwrap();
        let predictor = HarvestPredictor::default().with_ensemble(ensemble);

        let result =
            predictor.predict_at(&red_image(), CropKind::Mango, RipenessLabel::Unripe, fixed_now());
        assert!(matches!(
            result,
            Err(PredictionError::Encoding { kind: "crop", .. })
        ));
    }

    #[test]
    fn test_empty_ensemble_rejected() {
        assert!(matches!(
            HarvestEnsemble::new(Vec::new()),
            Err(PredictionError::Ensemble(_))
        ));
    }

    #[test]
    fn test_prediction_serializes_window_fields() {
        let prediction = HarvestPredictor::default()
            .predict_at(&red_image(), CropKind::Tomato, RipenessLabel::Ripe, fixed_now())
            .unwrap();
        let json = serde_json::to_value(&prediction).unwrap();
        assert_eq!(json["sub_stage"], "late");
        assert_eq!(json["source"], "rule_based");
        assert_eq!(json["harvest_window_days"]["latest"], 0.12);
        assert_eq!(json["harvest_window_dates"]["earliest"], "2024-03-01");
    }
}
