use care_bridge_data::models::{CreateMetricRequest, MetricRecord};
use tracing::debug;

use crate::entities::metric::{CreateReadingRequest, MetricType, Reading};

// Conversion functions between domain entities and data models
// These functions follow the pattern convert_to_[target_layer]_[model_name]

/// Convert a wire record into a domain reading
///
/// Returns `None` when the record lacks a metric type or a parseable
/// timestamp; such records never take part in aggregation. An unparseable
/// value is kept as [`crate::entities::MetricValue::Unparsed`].
pub fn convert_to_domain_reading(record: MetricRecord) -> Option<Reading> {
    let metric_type = match record.metric_type.as_deref().map(str::trim) {
        Some(key) if !key.is_empty() => MetricType::from(key),
        _ => return None,
    };
    let recorded_at = record.recorded_instant()?;

    let reading = Reading::new(
        metric_type,
        record.value.unwrap_or_default(),
        record.unit.unwrap_or_default(),
        recorded_at,
    );

    Some(Reading {
        id: record.id,
        notes: record.notes,
        ..reading
    })
}

/// Convert a batch of wire records, dropping the ones that cannot participate
pub fn convert_to_domain_readings(records: Vec<MetricRecord>) -> Vec<Reading> {
    let total = records.len();
    let readings: Vec<Reading> = records
        .into_iter()
        .filter_map(convert_to_domain_reading)
        .collect();

    if readings.len() < total {
        debug!(
            "Dropped {} of {} metric records without type or timestamp",
            total - readings.len(),
            total
        );
    }
    readings
}

/// Convert a domain create request into the wire payload
pub fn convert_to_data_create_request(request: &CreateReadingRequest) -> CreateMetricRequest {
    let unit = request
        .unit
        .clone()
        .or_else(|| Some(request.metric_type.default_unit().to_string()))
        .filter(|unit| !unit.is_empty());

    CreateMetricRequest {
        metric_type: request.metric_type.as_str().to_string(),
        value: request.value.trim().to_string(),
        unit,
        notes: request.notes.clone(),
    }
}
