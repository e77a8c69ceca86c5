use std::fmt;

use serde::{Deserialize, Serialize};

use super::metric::{MetricType, Reading};

/// Blood pressure category based on measurements
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum BloodPressureCategory {
    /// Normal blood pressure (systolic < 120 and diastolic < 80)
    Normal,

    /// Elevated blood pressure (systolic 120-129 and diastolic < 80)
    Elevated,

    /// Stage 1 Hypertension (systolic 130-139 or diastolic 80-89)
    Hypertension1,

    /// Stage 2 Hypertension (systolic ≥ 140 or diastolic ≥ 90)
    Hypertension2,

    /// Hypertensive crisis (systolic ≥ 180 and/or diastolic ≥ 120)
    HypertensiveCrisis,
}

impl fmt::Display for BloodPressureCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BloodPressureCategory::Normal => "Normal",
            BloodPressureCategory::Elevated => "Elevated",
            BloodPressureCategory::Hypertension1 => "Hypertension Stage 1",
            BloodPressureCategory::Hypertension2 => "Hypertension Stage 2",
            BloodPressureCategory::HypertensiveCrisis => "Hypertensive Crisis",
        };
        f.write_str(name)
    }
}

/// Where a value sits relative to the metric's normal range
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RangeStatus {
    Normal,
    Low,
    High,
    /// No range known for the metric, or the value did not parse
    Unknown,
}

/// A "latest value" tile for one metric type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatestTile {
    pub metric_type: MetricType,
    pub label: String,
    pub normal_range: String,
    pub reading: Reading,
    pub status: RangeStatus,
    /// Set for blood pressure readings that parsed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<BloodPressureCategory>,
}
