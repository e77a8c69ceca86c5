use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of health metric
///
/// Unknown keys are preserved verbatim in [`MetricType::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MetricType {
    Heartbeat,
    BloodPressure,
    Temperature,
    BloodOxygen,
    SugarLevel,
    Steps,
    Calories,
    SleepHours,
    Other(String),
}

impl MetricType {
    /// The metric types the dashboard knows how to label, in display order
    pub fn known() -> [MetricType; 8] {
        [
            MetricType::Heartbeat,
            MetricType::BloodPressure,
            MetricType::Temperature,
            MetricType::BloodOxygen,
            MetricType::SugarLevel,
            MetricType::Steps,
            MetricType::Calories,
            MetricType::SleepHours,
        ]
    }

    /// Wire key
    pub fn as_str(&self) -> &str {
        match self {
            MetricType::Heartbeat => "heartbeat",
            MetricType::BloodPressure => "blood_pressure",
            MetricType::Temperature => "temperature",
            MetricType::BloodOxygen => "blood_oxygen",
            MetricType::SugarLevel => "sugar_level",
            MetricType::Steps => "steps",
            MetricType::Calories => "calories",
            MetricType::SleepHours => "sleep_hours",
            MetricType::Other(key) => key,
        }
    }

    pub fn is_blood_pressure(&self) -> bool {
        matches!(self, MetricType::BloodPressure)
    }

    /// Human-readable name
    pub fn label(&self) -> String {
        match self {
            MetricType::Heartbeat => "Heart Rate".to_string(),
            MetricType::BloodPressure => "Blood Pressure".to_string(),
            MetricType::Temperature => "Temperature".to_string(),
            MetricType::BloodOxygen => "Blood Oxygen".to_string(),
            MetricType::SugarLevel => "Blood Sugar".to_string(),
            MetricType::Steps => "Steps".to_string(),
            MetricType::Calories => "Calories Burned".to_string(),
            MetricType::SleepHours => "Sleep Duration".to_string(),
            // snake_case key -> Title Case
            MetricType::Other(key) => key
                .split('_')
                .filter(|word| !word.is_empty())
                .map(|word| {
                    let mut chars = word.chars();
                    match chars.next() {
                        Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                        None => String::new(),
                    }
                })
                .collect::<Vec<_>>()
                .join(" "),
        }
    }

    /// Unit used when a reading carries none
    pub fn default_unit(&self) -> &'static str {
        match self {
            MetricType::Heartbeat => "bpm",
            MetricType::BloodPressure => "mmHg",
            MetricType::Temperature => "°F",
            MetricType::BloodOxygen => "%",
            MetricType::SugarLevel => "mg/dL",
            MetricType::Steps => "steps",
            MetricType::Calories => "kcal",
            MetricType::SleepHours => "hours",
            MetricType::Other(_) => "",
        }
    }

    /// Caption shown next to the latest value
    pub fn normal_range_caption(&self) -> &'static str {
        match self {
            MetricType::Heartbeat => "60-100 bpm",
            MetricType::BloodPressure => "90/60 - 120/80",
            MetricType::Temperature => "97.8°F - 99.1°F",
            MetricType::BloodOxygen => "95% - 100%",
            MetricType::SugarLevel => "70-140 mg/dL",
            MetricType::Steps => "8,000 - 10,000",
            MetricType::Calories => "1,800 - 2,500",
            MetricType::SleepHours => "7-9 hours",
            MetricType::Other(_) => "",
        }
    }
}

impl From<&str> for MetricType {
    fn from(key: &str) -> Self {
        match key {
            "heartbeat" => MetricType::Heartbeat,
            "blood_pressure" => MetricType::BloodPressure,
            "temperature" => MetricType::Temperature,
            "blood_oxygen" => MetricType::BloodOxygen,
            "sugar_level" => MetricType::SugarLevel,
            "steps" => MetricType::Steps,
            "calories" => MetricType::Calories,
            "sleep_hours" => MetricType::SleepHours,
            other => MetricType::Other(other.to_string()),
        }
    }
}

impl From<String> for MetricType {
    fn from(key: String) -> Self {
        match MetricType::from(key.as_str()) {
            MetricType::Other(_) => MetricType::Other(key),
            known => known,
        }
    }
}

impl From<MetricType> for String {
    fn from(metric_type: MetricType) -> Self {
        match metric_type {
            MetricType::Other(key) => key,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for MetricType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A reading's value, resolved once at ingestion
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MetricValue {
    /// Plain decimal value
    Numeric { value: f64 },
    /// Systolic over diastolic, mmHg
    BloodPressure { systolic: i32, diastolic: i32 },
    /// Raw value did not parse for its metric type
    Unparsed,
}

impl MetricValue {
    /// Resolve a raw wire value for `metric_type`
    ///
    /// Blood pressure expects `"<systolic>/<diastolic>"` with integer halves;
    /// everything else a finite decimal.
    pub fn parse(metric_type: &MetricType, raw: &str) -> Self {
        if metric_type.is_blood_pressure() {
            let parsed = raw.split_once('/').and_then(|(sys, dia)| {
                let systolic = sys.trim().parse::<i32>().ok()?;
                let diastolic = dia.trim().parse::<i32>().ok()?;
                Some((systolic, diastolic))
            });
            return match parsed {
                Some((systolic, diastolic)) => MetricValue::BloodPressure {
                    systolic,
                    diastolic,
                },
                None => MetricValue::Unparsed,
            };
        }

        match raw.trim().parse::<f64>() {
            Ok(value) if value.is_finite() => MetricValue::Numeric { value },
            _ => MetricValue::Unparsed,
        }
    }

    pub fn is_parsed(&self) -> bool {
        !matches!(self, MetricValue::Unparsed)
    }
}

/// One timestamped health measurement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    /// Server-side identifier, if known
    pub id: Option<i64>,

    /// Metric kind
    pub metric_type: MetricType,

    /// Resolved value
    pub value: MetricValue,

    /// Value exactly as received, for display
    pub raw_value: String,

    /// Display unit, not interpreted
    pub unit: String,

    /// When the measurement was taken
    pub recorded_at: DateTime<Utc>,

    /// Free text passed through unmodified
    pub notes: Option<String>,
}

impl Reading {
    /// Build a reading, resolving `raw_value` for `metric_type`
    pub fn new(
        metric_type: MetricType,
        raw_value: impl Into<String>,
        unit: impl Into<String>,
        recorded_at: DateTime<Utc>,
    ) -> Self {
        let raw_value = raw_value.into();
        let value = MetricValue::parse(&metric_type, &raw_value);
        Self {
            id: None,
            metric_type,
            value,
            raw_value,
            unit: unit.into(),
            recorded_at,
            notes: None,
        }
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

/// Request to record a new reading
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateReadingRequest {
    /// Metric kind
    pub metric_type: MetricType,

    /// Raw value, "120/80" for blood pressure
    pub value: String,

    /// Display unit; the metric's default unit when omitted
    pub unit: Option<String>,

    /// Optional notes about the reading
    pub notes: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_type_round_trips_known_and_unknown_keys() {
        for metric_type in MetricType::known() {
            assert_eq!(MetricType::from(metric_type.as_str()), metric_type);
        }
        let other = MetricType::from("respiratory_rate");
        assert_eq!(other, MetricType::Other("respiratory_rate".to_string()));
        assert_eq!(other.as_str(), "respiratory_rate");
        assert_eq!(other.label(), "Respiratory Rate");
    }

    #[test]
    fn test_metric_type_serde_uses_wire_key() {
        let json = serde_json::to_string(&MetricType::SleepHours).unwrap();
        assert_eq!(json, "\"sleep_hours\"");

        let parsed: MetricType = serde_json::from_str("\"blood_pressure\"").unwrap();
        assert_eq!(parsed, MetricType::BloodPressure);
    }

    #[test]
    fn test_parse_blood_pressure() {
        let bp = MetricType::BloodPressure;
        assert_eq!(
            MetricValue::parse(&bp, "120/80"),
            MetricValue::BloodPressure { systolic: 120, diastolic: 80 }
        );
        assert_eq!(
            MetricValue::parse(&bp, " 130 / 85 "),
            MetricValue::BloodPressure { systolic: 130, diastolic: 85 }
        );
        assert_eq!(MetricValue::parse(&bp, "not-a-number"), MetricValue::Unparsed);
        assert_eq!(MetricValue::parse(&bp, "120"), MetricValue::Unparsed);
        assert_eq!(MetricValue::parse(&bp, "120/abc"), MetricValue::Unparsed);
    }

    #[test]
    fn test_parse_numeric() {
        let temp = MetricType::Temperature;
        assert_eq!(MetricValue::parse(&temp, "98.6"), MetricValue::Numeric { value: 98.6 });
        assert_eq!(MetricValue::parse(&temp, " 99 "), MetricValue::Numeric { value: 99.0 });
        assert_eq!(MetricValue::parse(&temp, "warm"), MetricValue::Unparsed);
        assert_eq!(MetricValue::parse(&temp, "NaN"), MetricValue::Unparsed);
        assert_eq!(MetricValue::parse(&temp, ""), MetricValue::Unparsed);
    }

    #[test]
    fn test_parse_rejects_partial_values() {
        // Whole-value parsing only: no leading-number prefixes, no units, no decimals in mmHg
        let bp = MetricType::BloodPressure;
        assert_eq!(MetricValue::parse(&bp, "120.5/80"), MetricValue::Unparsed);
        assert_eq!(MetricValue::parse(&bp, "120/80 mmHg"), MetricValue::Unparsed);
        assert_eq!(MetricValue::parse(&bp, "120/80/70"), MetricValue::Unparsed);

        let heartbeat = MetricType::Heartbeat;
        assert_eq!(MetricValue::parse(&heartbeat, "72 bpm"), MetricValue::Unparsed);
        assert_eq!(MetricValue::parse(&heartbeat, "72abc"), MetricValue::Unparsed);
        assert_eq!(MetricValue::parse(&heartbeat, "7,200"), MetricValue::Unparsed);
    }
}
