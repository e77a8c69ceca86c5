use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use validator::Validate;

/// Wire model for a health metric record as returned by the API
///
/// Every field is optional on the wire. Records without a metric type or a
/// timestamp are kept here and dropped later during ingestion.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricRecord {
    /// Server-side identifier
    #[serde(default)]
    pub id: Option<i64>,

    /// Owning patient
    #[serde(default)]
    pub patient_id: Option<i64>,

    /// Metric key (heartbeat, blood_pressure, ...)
    #[serde(default)]
    pub metric_type: Option<String>,

    /// Raw value, "120/80" for blood pressure
    #[serde(default, deserialize_with = "string_or_number")]
    pub value: Option<String>,

    /// Display unit
    #[serde(default)]
    pub unit: Option<String>,

    /// When the measurement was taken
    #[serde(default)]
    pub recorded_at: Option<String>,

    /// Optional free text
    #[serde(default)]
    pub notes: Option<String>,
}

impl MetricRecord {
    /// Parsed `recorded_at`, if present and well-formed
    pub fn recorded_instant(&self) -> Option<DateTime<Utc>> {
        self.recorded_at.as_deref().and_then(parse_recorded_at)
    }
}

/// Envelope of the metrics listing endpoints
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetricsResponse {
    #[serde(default)]
    pub metrics: Vec<MetricRecord>,
}

/// Request payload for recording a new health metric
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateMetricRequest {
    /// Metric key
    #[validate(length(min = 1, max = 50, message = "Metric type must be between 1 and 50 characters"))]
    pub metric_type: String,

    /// Raw value
    #[validate(length(min = 1, max = 100, message = "Value must be between 1 and 100 characters"))]
    pub value: String,

    /// Optional display unit
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 20, message = "Unit cannot exceed 20 characters"))]
    pub unit: Option<String>,

    /// Optional notes about the reading
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 1000, message = "Notes cannot exceed 1000 characters"))]
    pub notes: Option<String>,
}

/// Response of the create endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct CreateMetricResponse {
    #[serde(default)]
    pub message: Option<String>,
    pub metric: MetricRecord,
}

/// Parse a wire timestamp.
///
/// Accepts RFC 3339 with an offset, or a naive ISO-8601 date-time which the
/// backend emits for UTC instants.
pub fn parse_recorded_at(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(|naive| naive.and_utc())
}

/// Format an instant the way the backend serialises `recorded_at`
pub fn format_recorded_at(instant: &DateTime<Utc>) -> String {
    instant.naive_utc().format("%Y-%m-%dT%H:%M:%S%.f").to_string()
}

fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}
