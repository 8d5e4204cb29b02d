//! Common types used across the platform

use serde::{Deserialize, Serialize};

use crate::models::{CropKind, RipenessLabel};

/// Output of the upstream image classifier
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StageDetection {
    pub crop: CropKind,
    pub stage: RipenessLabel,
    /// Crop confidence as a percentage (0-100), 2 decimals
    pub crop_confidence: f64,
    /// Stage confidence as a percentage (0-100), 2 decimals
    pub stage_confidence: f64,
}

/// Which path produced a harvest window
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WindowSource {
    Ensemble,
    RuleBased,
}

/// Round to 2 decimal places
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_round2() {
        assert_eq!(round2(0.08000000000000002), 0.08);
        assert_eq!(round2(1.234), 1.23);
        assert_eq!(round2(1.236), 1.24);
        assert_eq!(round2(15.0), 15.0);
    }

    proptest! {
        #[test]
        fn test_round2_is_idempotent(value in -1.0e6..1.0e6f64) {
            let once = round2(value);
            prop_assert_eq!(round2(once), once);
            prop_assert!((once - value).abs() <= 0.005 + 1e-9);
        }
    }
}
