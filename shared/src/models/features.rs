//! Visual descriptors and sub-stage classification

use serde::{Deserialize, Serialize};

use super::{CropKind, RipenessLabel, SubStageLabel};

/// Five scalar descriptors of a crop photo.
///
/// Values use 8-bit channel conventions: hue in [0, 180), saturation,
/// brightness and `a_channel` in [0, 255]. `sharpness` is the population
/// variance of the Laplacian response of the grayscale image.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct VisualFeatures {
    pub hue: f64,
    pub saturation: f64,
    pub brightness: f64,
    pub sharpness: f64,
    /// Mean of the green-red opponent channel of Lab
    pub a_channel: f64,
}

// Calibrated thresholds. Boundaries are part of the behaviour.
const A_CHANNEL_MID: f64 = 135.0;
const A_CHANNEL_LATE: f64 = 150.0;
const HUE_EARLY: f64 = 55.0;
const HUE_MID: f64 = 40.0;
const SHARPNESS_EARLY: f64 = 120.0;
const SHARPNESS_MID: f64 = 80.0;

/// Refine a coarse ripeness stage into early / mid / late.
///
/// A ripe fruit is always `Late`. Otherwise tomato and papaya are split on
/// the `a` channel, banana on hue, and mango on sharpness.
pub fn classify_sub_stage(
    features: &VisualFeatures,
    crop: CropKind,
    stage: RipenessLabel,
) -> SubStageLabel {
    if stage == RipenessLabel::Ripe {
        return SubStageLabel::Late;
    }

    match crop {
        CropKind::Tomato | CropKind::Papaya => {
            if features.a_channel < A_CHANNEL_MID {
                SubStageLabel::Early
            } else if features.a_channel < A_CHANNEL_LATE {
                SubStageLabel::Mid
            } else {
                SubStageLabel::Late
            }
        }
        CropKind::Banana => {
            if features.hue > HUE_EARLY {
                SubStageLabel::Early
            } else if features.hue > HUE_MID {
                SubStageLabel::Mid
            } else {
                SubStageLabel::Late
            }
        }
        CropKind::Mango => {
            if features.sharpness > SHARPNESS_EARLY {
                SubStageLabel::Early
            } else if features.sharpness > SHARPNESS_MID {
                SubStageLabel::Mid
            } else {
                SubStageLabel::Late
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_a(a_channel: f64) -> VisualFeatures {
        VisualFeatures {
            a_channel,
            ..Default::default()
        }
    }

    #[test]
    fn test_papaya_boundaries() {
        let classify = |a| classify_sub_stage(&with_a(a), CropKind::Papaya, RipenessLabel::Unripe);
        assert_eq!(classify(134.99), SubStageLabel::Early);
        assert_eq!(classify(135.0), SubStageLabel::Mid);
        assert_eq!(classify(149.99), SubStageLabel::Mid);
        assert_eq!(classify(150.0), SubStageLabel::Late);
    }

    #[test]
    fn test_mango_boundaries() {
        let classify = |sharpness| {
            let features = VisualFeatures {
                sharpness,
                ..Default::default()
            };
            classify_sub_stage(&features, CropKind::Mango, RipenessLabel::Semiripe)
        };
        assert_eq!(classify(120.01), SubStageLabel::Early);
        assert_eq!(classify(120.0), SubStageLabel::Mid);
        assert_eq!(classify(80.01), SubStageLabel::Mid);
        assert_eq!(classify(80.0), SubStageLabel::Late);
    }

    #[test]
    fn test_banana_boundaries() {
        let classify = |hue| {
            let features = VisualFeatures {
                hue,
                ..Default::default()
            };
            classify_sub_stage(&features, CropKind::Banana, RipenessLabel::Unripe)
        };
        assert_eq!(classify(55.0), SubStageLabel::Mid);
        assert_eq!(classify(40.0), SubStageLabel::Late);
        assert_eq!(classify(40.5), SubStageLabel::Mid);
    }

    #[test]
    fn test_ripe_ignores_features() {
        let features = with_a(0.0);
        assert_eq!(
            classify_sub_stage(&features, CropKind::Tomato, RipenessLabel::Ripe),
            SubStageLabel::Late
        );
    }
}
