//! Label encoding for ensemble feature vectors

use super::{CropKind, PredictionError, RipenessLabel, SubStageLabel, VisualFeatures};

/// A categorical label that can be encoded as an integer
pub trait Label: Copy + Eq + 'static {
    /// Kind name used in error messages
    const KIND: &'static str;

    fn name(&self) -> &'static str;

    fn all() -> &'static [Self];
}

impl Label for CropKind {
    const KIND: &'static str = "crop";

    fn name(&self) -> &'static str {
        self.as_str()
    }

    fn all() -> &'static [Self] {
        &CropKind::ALL
    }
}

impl Label for RipenessLabel {
    const KIND: &'static str = "stage";

    fn name(&self) -> &'static str {
        self.as_str()
    }

    fn all() -> &'static [Self] {
        &RipenessLabel::ALL
    }
}

impl Label for SubStageLabel {
    const KIND: &'static str = "sub-stage";

    fn name(&self) -> &'static str {
        self.as_str()
    }

    fn all() -> &'static [Self] {
        &SubStageLabel::ALL
    }
}

/// Maps labels to indices in alphabetical order of their names.
///
/// An encoder fitted on a subset of the classes fails on the others.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelEncoder<T: Label> {
    classes: Vec<T>,
}

impl<T: Label> LabelEncoder<T> {
    pub fn fit<I: IntoIterator<Item = T>>(classes: I) -> Self {
        let mut classes: Vec<T> = classes.into_iter().collect();
        classes.sort_by_key(|c| c.name());
        classes.dedup();
        Self { classes }
    }

    /// Fit on every variant of the label type
    pub fn fit_all() -> Self {
        Self::fit(T::all().iter().copied())
    }

    pub fn transform(&self, label: T) -> Result<usize, PredictionError> {
        self.classes
            .iter()
            .position(|c| *c == label)
            .ok_or_else(|| PredictionError::Encoding {
                kind: T::KIND,
                label: label.name().to_string(),
            })
    }

    pub fn classes(&self) -> &[T] {
        &self.classes
    }
}

impl<T: Label> Default for LabelEncoder<T> {
    fn default() -> Self {
        Self::fit_all()
    }
}

/// Encoders for the three categorical inputs of an ensemble
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeatureEncoders {
    pub crop: LabelEncoder<CropKind>,
    pub stage: LabelEncoder<RipenessLabel>,
    pub sub_stage: LabelEncoder<SubStageLabel>,
}

/// Number of entries in an ensemble feature vector
pub const FEATURE_VECTOR_LEN: usize = 7;

impl FeatureEncoders {
    /// Build `[crop, stage, sub_stage, hue, saturation, brightness, sharpness]`
    pub fn feature_vector(
        &self,
        crop: CropKind,
        stage: RipenessLabel,
        sub_stage: SubStageLabel,
        features: &VisualFeatures,
    ) -> Result<[f64; FEATURE_VECTOR_LEN], PredictionError> {
        Ok([
            self.crop.transform(crop)? as f64,
            self.stage.transform(stage)? as f64,
            self.sub_stage.transform(sub_stage)? as f64,
            features.hue,
            features.saturation,
            features.brightness,
            features.sharpness,
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alphabetical_indices() {
        let crops = LabelEncoder::<CropKind>::fit_all();
        assert_eq!(crops.transform(CropKind::Banana).unwrap(), 0);
        assert_eq!(crops.transform(CropKind::Mango).unwrap(), 1);
        assert_eq!(crops.transform(CropKind::Papaya).unwrap(), 2);
        assert_eq!(crops.transform(CropKind::Tomato).unwrap(), 3);

        let stages = LabelEncoder::<RipenessLabel>::fit_all();
        assert_eq!(stages.transform(RipenessLabel::Ripe).unwrap(), 0);
        assert_eq!(stages.transform(RipenessLabel::Semiripe).unwrap(), 1);
        assert_eq!(stages.transform(RipenessLabel::Unripe).unwrap(), 2);

        let subs = LabelEncoder::<SubStageLabel>::fit_all();
        assert_eq!(subs.transform(SubStageLabel::Early).unwrap(), 0);
        assert_eq!(subs.transform(SubStageLabel::Late).unwrap(), 1);
        assert_eq!(subs.transform(SubStageLabel::Mid).unwrap(), 2);
    }

    #[test]
    fn test_unfitted_label_fails() {
        let crops = LabelEncoder::fit([CropKind::Tomato, CropKind::Banana]);
        assert_eq!(crops.transform(CropKind::Tomato).unwrap(), 1);
        assert_eq!(
            crops.transform(CropKind::Mango),
            Err(PredictionError::Encoding {
                kind: "crop",
                label: "mango".to_string()
            })
        );
    }

    #[test]
    fn test_feature_vector_layout() {
        let features = VisualFeatures {
            hue: 30.0,
            saturation: 120.0,
            brightness: 200.0,
            sharpness: 95.5,
            a_channel: 150.0,
        };
        let vector = FeatureEncoders::default()
            .feature_vector(
                CropKind::Tomato,
                RipenessLabel::Unripe,
                SubStageLabel::Mid,
                &features,
            )
            .unwrap();
        assert_eq!(vector, [3.0, 2.0, 2.0, 30.0, 120.0, 200.0, 95.5]);
    }
}
