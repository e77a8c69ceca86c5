use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::metric::MetricType;

/// Window lengths offered by the dashboard
pub const PERIOD_OPTIONS: [u32; 3] = [7, 30, 90];

/// Parameters of a chart series
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct SeriesRequest {
    /// Metric to chart
    pub metric_type: MetricType,

    /// Trailing window in days
    #[validate(range(min = 1, message = "Window must be at least 1 day"))]
    pub window_days: u32,
}

impl SeriesRequest {
    pub fn new(metric_type: MetricType, window_days: u32) -> Self {
        Self {
            metric_type,
            window_days,
        }
    }
}

/// Aggregated value of one chart point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PointValue {
    /// Daily mean rounded to one decimal
    Numeric { value: f64, unit: String },
    /// Daily means rounded to whole mmHg
    BloodPressure { systolic: i32, diastolic: i32 },
}

/// One day of a chart series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    /// Calendar day in the viewer's zone, serialised `YYYY-MM-DD`
    pub date: NaiveDate,

    /// Short label, e.g. "May 1"
    pub display_date: String,

    /// Short weekday, e.g. "Wed"
    pub weekday_label: String,

    #[serde(flatten)]
    pub value: PointValue,
}

impl ChartPoint {
    pub fn new(date: NaiveDate, value: PointValue) -> Self {
        Self {
            date,
            display_date: date.format("%b %-d").to_string(),
            weekday_label: date.format("%a").to_string(),
            value,
        }
    }
}
