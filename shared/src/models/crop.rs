//! Crop and ripeness labels

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::PredictionError;

/// Supported crop species
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum CropKind {
    Tomato,
    Banana,
    Mango,
    Papaya,
}

impl CropKind {
    pub const ALL: [CropKind; 4] = [
        CropKind::Tomato,
        CropKind::Banana,
        CropKind::Mango,
        CropKind::Papaya,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CropKind::Tomato => "tomato",
            CropKind::Banana => "banana",
            CropKind::Mango => "mango",
            CropKind::Papaya => "papaya",
        }
    }

    pub(crate) fn index(self) -> usize {
        match self {
            CropKind::Tomato => 0,
            CropKind::Banana => 1,
            CropKind::Mango => 2,
            CropKind::Papaya => 3,
        }
    }
}

impl fmt::Display for CropKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CropKind {
    type Err = PredictionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "tomato" => Ok(CropKind::Tomato),
            "banana" => Ok(CropKind::Banana),
            "mango" => Ok(CropKind::Mango),
            "papaya" => Ok(CropKind::Papaya),
            _ => Err(PredictionError::UnsupportedCrop(s.to_string())),
        }
    }
}

impl TryFrom<String> for CropKind {
    type Error = PredictionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Coarse ripeness stage produced by the image classifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum RipenessLabel {
    Unripe,
    Semiripe,
    Ripe,
}

impl RipenessLabel {
    pub const ALL: [RipenessLabel; 3] = [
        RipenessLabel::Unripe,
        RipenessLabel::Semiripe,
        RipenessLabel::Ripe,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RipenessLabel::Unripe => "unripe",
            RipenessLabel::Semiripe => "semiripe",
            RipenessLabel::Ripe => "ripe",
        }
    }

    pub(crate) fn index(self) -> usize {
        match self {
            RipenessLabel::Unripe => 0,
            RipenessLabel::Semiripe => 1,
            RipenessLabel::Ripe => 2,
        }
    }
}

impl fmt::Display for RipenessLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RipenessLabel {
    type Err = PredictionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "unripe" => Ok(RipenessLabel::Unripe),
            "semiripe" | "semi-ripe" | "semi_ripe" => Ok(RipenessLabel::Semiripe),
            "ripe" => Ok(RipenessLabel::Ripe),
            _ => Err(PredictionError::UnsupportedStage(s.to_string())),
        }
    }
}

impl TryFrom<String> for RipenessLabel {
    type Error = PredictionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Fine-grained refinement of a ripeness stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubStageLabel {
    Early,
    Mid,
    Late,
}

impl SubStageLabel {
    pub const ALL: [SubStageLabel; 3] = [SubStageLabel::Early, SubStageLabel::Mid, SubStageLabel::Late];

    pub fn as_str(&self) -> &'static str {
        match self {
            SubStageLabel::Early => "early",
            SubStageLabel::Mid => "mid",
            SubStageLabel::Late => "late",
        }
    }

    pub(crate) fn index(self) -> usize {
        match self {
            SubStageLabel::Early => 0,
            SubStageLabel::Mid => 1,
            SubStageLabel::Late => 2,
        }
    }
}

impl fmt::Display for SubStageLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SubStageLabel {
    type Err = PredictionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "early" => Ok(SubStageLabel::Early),
            "mid" => Ok(SubStageLabel::Mid),
            "late" => Ok(SubStageLabel::Late),
            _ => Err(PredictionError::UnsupportedSubStage(s.to_string())),
        }
    }
}
