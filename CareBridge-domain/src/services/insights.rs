use crate::entities::{BloodPressureCategory, LatestTile, MetricType, MetricValue, RangeStatus, Reading};

/// Categorize blood pressure based on measurements
pub fn categorize_blood_pressure(systolic: i32, diastolic: i32) -> BloodPressureCategory {
    if systolic >= 180 || diastolic >= 120 {
        BloodPressureCategory::HypertensiveCrisis
    } else if systolic >= 140 || diastolic >= 90 {
        BloodPressureCategory::Hypertension2
    } else if systolic >= 130 || diastolic >= 80 {
        BloodPressureCategory::Hypertension1
    } else if systolic >= 120 && diastolic < 80 {
        BloodPressureCategory::Elevated
    } else {
        BloodPressureCategory::Normal
    }
}

/// Inclusive normal range for metrics that have one
fn normal_range(metric_type: &MetricType) -> Option<(f64, f64)> {
    match metric_type {
        MetricType::Heartbeat => Some((60.0, 100.0)),
        MetricType::Temperature => Some((97.0, 99.0)),
        MetricType::BloodOxygen => Some((95.0, 100.0)),
        MetricType::SugarLevel => Some((70.0, 140.0)),
        MetricType::SleepHours => Some((7.0, 9.0)),
        _ => None,
    }
}

/// Check a numeric value against the metric's normal range
pub fn check_metric_range(metric_type: &MetricType, value: f64) -> RangeStatus {
    match normal_range(metric_type) {
        Some((min, _)) if value < min => RangeStatus::Low,
        Some((_, max)) if value > max => RangeStatus::High,
        Some(_) => RangeStatus::Normal,
        None => RangeStatus::Unknown,
    }
}

/// Build the "latest value" tile for a reading
pub fn assess_latest(reading: &Reading) -> LatestTile {
    let (status, category) = match reading.value {
        MetricValue::BloodPressure { systolic, diastolic } => {
            let category = categorize_blood_pressure(systolic, diastolic);
            let status = if systolic < 90 || diastolic < 60 {
                RangeStatus::Low
            } else {
                match category {
                    BloodPressureCategory::Normal | BloodPressureCategory::Elevated => RangeStatus::Normal,
                    _ => RangeStatus::High,
                }
            };
            (status, Some(category))
        }
        MetricValue::Numeric { value } => (check_metric_range(&reading.metric_type, value), None),
        MetricValue::Unparsed => (RangeStatus::Unknown, None),
    };

    LatestTile {
        metric_type: reading.metric_type.clone(),
        label: reading.metric_type.label(),
        normal_range: reading.metric_type.normal_range_caption().to_string(),
        reading: reading.clone(),
        status,
        category,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn reading(metric_type: MetricType, value: &str) -> Reading {
        let recorded_at = Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap();
        Reading::new(metric_type, value, "", recorded_at)
    }

    #[test]
    fn test_bp_category_normal() {
        let category = categorize_blood_pressure(110, 75);
        assert_eq!(category, BloodPressureCategory::Normal);
    }

    #[test]
    fn test_bp_category_elevated() {
        let category = categorize_blood_pressure(125, 75);
        assert_eq!(category, BloodPressureCategory::Elevated);
    }

    #[test]
    fn test_bp_category_hypertension1() {
        // Systolic in range
        assert_eq!(categorize_blood_pressure(135, 75), BloodPressureCategory::Hypertension1);
        // Diastolic in range
        assert_eq!(categorize_blood_pressure(120, 85), BloodPressureCategory::Hypertension1);
    }

    #[test]
    fn test_bp_category_hypertension2() {
        assert_eq!(categorize_blood_pressure(145, 75), BloodPressureCategory::Hypertension2);
        assert_eq!(categorize_blood_pressure(120, 95), BloodPressureCategory::Hypertension2);
    }

    #[test]
    fn test_bp_category_crisis() {
        assert_eq!(categorize_blood_pressure(185, 75), BloodPressureCategory::HypertensiveCrisis);
        assert_eq!(categorize_blood_pressure(120, 125), BloodPressureCategory::HypertensiveCrisis);
    }

    #[test]
    fn test_check_metric_range() {
        assert_eq!(check_metric_range(&MetricType::Heartbeat, 59.9), RangeStatus::Low);
        assert_eq!(check_metric_range(&MetricType::Heartbeat, 60.0), RangeStatus::Normal);
        assert_eq!(check_metric_range(&MetricType::Heartbeat, 100.0), RangeStatus::Normal);
        assert_eq!(check_metric_range(&MetricType::Heartbeat, 101.0), RangeStatus::High);
        assert_eq!(check_metric_range(&MetricType::Temperature, 99.5), RangeStatus::High);
        assert_eq!(check_metric_range(&MetricType::SleepHours, 6.5), RangeStatus::Low);
        assert_eq!(check_metric_range(&MetricType::Steps, 2.0), RangeStatus::Unknown);
        assert_eq!(check_metric_range(&MetricType::from("mood"), 2.0), RangeStatus::Unknown);
    }

    #[test]
    fn test_assess_latest_numeric() {
        let tile = assess_latest(&reading(MetricType::SugarLevel, "150"));
        assert_eq!(tile.label, "Blood Sugar");
        assert_eq!(tile.normal_range, "70-140 mg/dL");
        assert_eq!(tile.status, RangeStatus::High);
        assert_eq!(tile.category, None);
    }

    #[test]
    fn test_assess_latest_blood_pressure() {
        let tile = assess_latest(&reading(MetricType::BloodPressure, "118/76"));
        assert_eq!(tile.status, RangeStatus::Normal);
        assert_eq!(tile.category, Some(BloodPressureCategory::Normal));

        let tile = assess_latest(&reading(MetricType::BloodPressure, "142/91"));
        assert_eq!(tile.status, RangeStatus::High);
        assert_eq!(tile.category, Some(BloodPressureCategory::Hypertension2));

        let tile = assess_latest(&reading(MetricType::BloodPressure, "85/55"));
        assert_eq!(tile.status, RangeStatus::Low);
    }

    #[test]
    fn test_assess_latest_unparsed_value() {
        let tile = assess_latest(&reading(MetricType::Heartbeat, "fast"));
        assert_eq!(tile.status, RangeStatus::Unknown);
        assert_eq!(tile.reading.raw_value, "fast");
    }
}
