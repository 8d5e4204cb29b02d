//! Harvest timing models

use std::fmt;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{CropKind, RipenessLabel, SubStageLabel};
use crate::types::round2;

/// Errors raised while predicting a harvest window
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PredictionError {
    #[error("Invalid image: {0}")]
    InvalidImage(String),

    #[error("Unsupported crop: {0}")]
    UnsupportedCrop(String),

    #[error("Unsupported ripeness stage: {0}")]
    UnsupportedStage(String),

    #[error("Unsupported sub-stage: {0}")]
    UnsupportedSubStage(String),

    #[error("Cannot encode {kind} label '{label}'")]
    Encoding { kind: &'static str, label: String },

    #[error("Ensemble error: {0}")]
    Ensemble(String),

    #[error("Day offset {0} is out of the representable date range")]
    DateOutOfRange(f64),
}

/// Composite key of the base harvest days table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HarvestKey {
    pub crop: CropKind,
    pub stage: RipenessLabel,
    pub sub_stage: SubStageLabel,
}

impl HarvestKey {
    pub fn new(crop: CropKind, stage: RipenessLabel, sub_stage: SubStageLabel) -> Self {
        Self {
            crop,
            stage,
            sub_stage,
        }
    }

    /// Every key of the closed enumeration
    pub fn all() -> impl Iterator<Item = HarvestKey> {
        CropKind::ALL.into_iter().flat_map(|crop| {
            RipenessLabel::ALL.into_iter().flat_map(move |stage| {
                SubStageLabel::ALL
                    .into_iter()
                    .map(move |sub_stage| HarvestKey::new(crop, stage, sub_stage))
            })
        })
    }
}

impl fmt::Display for HarvestKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.crop, self.stage, self.sub_stage)
    }
}

/// Errors building a custom base days table
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TableError {
    #[error("Base harvest days table is missing {} entries", missing.len())]
    IncompleteTable { missing: Vec<HarvestKey> },

    #[error("Base harvest days for {key} must be finite and positive, got {days}")]
    InvalidBaseDays { key: HarvestKey, days: f64 },
}

type DaysGrid = [[[f64; 3]; 3]; 4];

/// Expected days to harvest per crop, stage and sub-stage.
///
/// Storage is indexed by the key itself, so every combination always has
/// an entry and lookups cannot miss.
#[derive(Debug, Clone, PartialEq)]
pub struct BaseHarvestDaysTable {
    days: DaysGrid,
}

// crop: tomato, banana, mango, papaya
// stage: unripe, semiripe, ripe
// sub-stage: early, mid, late
static STANDARD_TABLE: BaseHarvestDaysTable = BaseHarvestDaysTable {
    days: [
        [[3.0, 1.5, 0.7], [2.5, 1.2, 0.5], [0.2, 0.1, 0.1]],
        [[4.0, 2.5, 1.2], [3.0, 1.8, 0.8], [0.3, 0.2, 0.2]],
        [[5.0, 3.0, 1.5], [3.5, 2.0, 1.0], [0.4, 0.3, 0.3]],
        [[3.5, 2.0, 1.0], [2.8, 1.5, 0.6], [0.3, 0.2, 0.2]],
    ],
};

impl BaseHarvestDaysTable {
    /// The compiled-in table
    pub fn standard() -> &'static BaseHarvestDaysTable {
        &STANDARD_TABLE
    }

    /// Build a table from explicit entries; every combination must be present.
    /// Later entries for the same key replace earlier ones.
    pub fn from_entries<I>(entries: I) -> Result<Self, TableError>
    where
        I: IntoIterator<Item = (HarvestKey, f64)>,
    {
        let mut slots: [[[Option<f64>; 3]; 3]; 4] = [[[None; 3]; 3]; 4];

        for (key, days) in entries {
            if !days.is_finite() || days <= 0.0 {
                return Err(TableError::InvalidBaseDays { key, days });
            }
            slots[key.crop.index()][key.stage.index()][key.sub_stage.index()] = Some(days);
        }

        let missing: Vec<HarvestKey> = HarvestKey::all()
            .filter(|k| slots[k.crop.index()][k.stage.index()][k.sub_stage.index()].is_none())
            .collect();
        if !missing.is_empty() {
            return Err(TableError::IncompleteTable { missing });
        }

        let mut days: DaysGrid = [[[0.0; 3]; 3]; 4];
        for key in HarvestKey::all() {
            let (c, s, ss) = (key.crop.index(), key.stage.index(), key.sub_stage.index());
            days[c][s][ss] = slots[c][s][ss].unwrap_or_default();
        }
        Ok(Self { days })
    }

    pub fn lookup(&self, key: HarvestKey) -> f64 {
        self.days[key.crop.index()][key.stage.index()][key.sub_stage.index()]
    }

    /// All entries in key order
    pub fn entries(&self) -> impl Iterator<Item = (HarvestKey, f64)> + '_ {
        HarvestKey::all().map(move |key| (key, self.lookup(key)))
    }
}

impl Default for BaseHarvestDaysTable {
    fn default() -> Self {
        Self::standard().clone()
    }
}

/// Window day-counts from the ±20% rule
pub fn rule_based_days(base_days: f64) -> (f64, f64, f64) {
    (base_days * 0.8, base_days, base_days * 1.2)
}

/// Earliest / expected / latest day-counts, rounded to 2 decimals
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct WindowDays {
    pub earliest: f64,
    pub expected: f64,
    pub latest: f64,
}

/// Calendar dates for the window, serialized as `YYYY-MM-DD`
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct WindowDates {
    pub earliest: NaiveDate,
    pub expected: NaiveDate,
    pub latest: NaiveDate,
}

/// Predicted harvest timing
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct HarvestWindow {
    #[serde(rename = "harvest_window_days")]
    pub days: WindowDays,
    #[serde(rename = "harvest_window_dates")]
    pub dates: WindowDates,
}

impl HarvestWindow {
    /// Build a window relative to the evaluation instant `now`.
    /// Dates are derived from the unrounded day-counts.
    pub fn from_day_counts(
        earliest: f64,
        expected: f64,
        latest: f64,
        now: DateTime<Utc>,
    ) -> Result<Self, PredictionError> {
        Ok(Self {
            days: WindowDays {
                earliest: round2(earliest),
                expected: round2(expected),
                latest: round2(latest),
            },
            dates: WindowDates {
                earliest: date_after(now, earliest)?,
                expected: date_after(now, expected)?,
                latest: date_after(now, latest)?,
            },
        })
    }
}

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Calendar date reached by adding a real-valued day offset to `now`
pub fn date_after(now: DateTime<Utc>, days: f64) -> Result<NaiveDate, PredictionError> {
    let millis = (days * MILLIS_PER_DAY).round();
    if !millis.is_finite() || millis.abs() > i64::MAX as f64 {
        return Err(PredictionError::DateOutOfRange(days));
    }
    Duration::try_milliseconds(millis as i64)
        .and_then(|offset| now.checked_add_signed(offset))
        .map(|at| at.date_naive())
        .ok_or(PredictionError::DateOutOfRange(days))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_standard_table_values() {
        let table = BaseHarvestDaysTable::standard();
        let key = HarvestKey::new(CropKind::Tomato, RipenessLabel::Ripe, SubStageLabel::Late);
        assert_eq!(table.lookup(key), 0.1);
        let key = HarvestKey::new(CropKind::Mango, RipenessLabel::Unripe, SubStageLabel::Early);
        assert_eq!(table.lookup(key), 5.0);
        let key = HarvestKey::new(CropKind::Papaya, RipenessLabel::Semiripe, SubStageLabel::Late);
        assert_eq!(table.lookup(key), 0.6);
    }

    #[test]
    fn test_every_key_is_positive() {
        assert_eq!(HarvestKey::all().count(), 36);
        for (key, days) in BaseHarvestDaysTable::standard().entries() {
            assert!(days > 0.0, "{} has non-positive days", key);
        }
    }

    #[test]
    fn test_from_entries_round_trips_standard() {
        let entries: Vec<_> = BaseHarvestDaysTable::standard().entries().collect();
        let table = BaseHarvestDaysTable::from_entries(entries).unwrap();
        assert_eq!(&table, BaseHarvestDaysTable::standard());
    }

    #[test]
    fn test_from_entries_reports_missing_keys() {
        let entries: Vec<_> = BaseHarvestDaysTable::standard()
            .entries()
            .filter(|(k, _)| k.crop != CropKind::Mango)
            .collect();
        match BaseHarvestDaysTable::from_entries(entries) {
            Err(TableError::IncompleteTable { missing }) => {
                assert_eq!(missing.len(), 9);
                assert!(missing.iter().all(|k| k.crop == CropKind::Mango));
            }
            other => panic!("expected incomplete table, got {:?}", other),
        }
    }

    #[test]
    fn test_from_entries_rejects_non_positive_days() {
        let key = HarvestKey::new(CropKind::Banana, RipenessLabel::Ripe, SubStageLabel::Mid);
        let result = BaseHarvestDaysTable::from_entries(vec![(key, 0.0)]);
        assert!(matches!(result, Err(TableError::InvalidBaseDays { .. })));
    }

    #[test]
    fn test_window_dates_from_fixed_instant() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let (e, x, l) = rule_based_days(15.0);
        let window = HarvestWindow::from_day_counts(e, x, l, now).unwrap();
        assert_eq!(window.days.expected, 15.0);
        assert_eq!(window.days.earliest, 12.0);
        assert_eq!(window.days.latest, 18.0);
        assert_eq!(window.dates.expected.to_string(), "2024-03-16");
        assert_eq!(window.dates.earliest.to_string(), "2024-03-13");
        assert_eq!(window.dates.latest.to_string(), "2024-03-19");
    }

    #[test]
    fn test_fractional_days_cross_midnight() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 22, 0, 0).unwrap();
        assert_eq!(date_after(now, 0.05).unwrap().to_string(), "2024-03-01");
        assert_eq!(date_after(now, 0.1).unwrap().to_string(), "2024-03-02");
    }

    #[test]
    fn test_date_out_of_range() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        assert!(date_after(now, f64::INFINITY).is_err());
        assert!(date_after(now, 1.0e15).is_err());
    }
}
