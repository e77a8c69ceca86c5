//! Client-side aggregation of health readings
//!
//! Two pure operations over an unordered reading set: the latest reading per
//! metric type, and a per-day averaged series for one metric over a trailing
//! window. Both are a single pass over the input. Malformed values are
//! excluded locally and never surface as errors; only a malformed call
//! contract does.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use thiserror::Error;
use tracing::debug;
use validator::Validate;

use crate::entities::{ChartPoint, MetricType, MetricValue, PointValue, Reading, SeriesRequest};
use care_bridge_data::validation::describe_validation_errors;

/// Aggregation errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AggregationError {
    /// The caller passed an invalid window or metric key
    #[error("Invalid series request: {0}")]
    InvalidRequest(String),
}

impl SeriesRequest {
    /// Check the call contract before aggregating
    pub fn check(&self) -> Result<(), AggregationError> {
        if let Err(errors) = self.validate() {
            return Err(AggregationError::InvalidRequest(
                describe_validation_errors(&errors),
            ));
        }

        if let MetricType::Other(key) = &self.metric_type {
            if key.trim().is_empty() {
                return Err(AggregationError::InvalidRequest(
                    "metric_type: Metric type is required".to_string(),
                ));
            }
        }

        Ok(())
    }
}

/// Latest reading per metric type
///
/// When two readings of a type share a timestamp, the one scanned last wins.
pub fn latest_by_type(readings: &[Reading]) -> HashMap<MetricType, Reading> {
    let mut latest: HashMap<&MetricType, &Reading> = HashMap::new();

    for reading in readings {
        match latest.get(&reading.metric_type) {
            Some(current) if current.recorded_at > reading.recorded_at => {}
            _ => {
                latest.insert(&reading.metric_type, reading);
            }
        }
    }

    latest
        .into_iter()
        .map(|(metric_type, reading)| (metric_type.clone(), reading.clone()))
        .collect()
}

/// Values collected for one calendar day
#[derive(Debug, Default)]
struct DailyBucket {
    values: Vec<f64>,
    systolic: Vec<i32>,
    diastolic: Vec<i32>,
}

impl DailyBucket {
    fn into_point_value(self, blood_pressure: bool, unit: &str) -> PointValue {
        if blood_pressure {
            PointValue::BloodPressure {
                systolic: mean_i32(&self.systolic).round() as i32,
                diastolic: mean_i32(&self.diastolic).round() as i32,
            }
        } else {
            PointValue::Numeric {
                value: round1(mean(&self.values)),
                unit: unit.to_string(),
            }
        }
    }
}

/// Daily averaged series for one metric over a trailing window
///
/// Readings are bucketed by calendar day in the time zone of `now`. Days whose
/// readings all failed to parse still produce a point, valued zero.
pub fn build_series<Tz: TimeZone>(
    readings: &[Reading],
    request: &SeriesRequest,
    now: &DateTime<Tz>,
) -> Result<Vec<ChartPoint>, AggregationError> {
    request.check()?;

    let zone = now.timezone();
    // Windows reaching past the representable range include everything
    let cutoff = Duration::try_days(i64::from(request.window_days))
        .and_then(|window| now.with_timezone(&Utc).checked_sub_signed(window))
        .unwrap_or(DateTime::<Utc>::MIN_UTC);
    let blood_pressure = request.metric_type.is_blood_pressure();

    let mut buckets: BTreeMap<NaiveDate, DailyBucket> = BTreeMap::new();
    // Unit of the earliest matching reading
    let mut earliest: Option<(DateTime<Utc>, &str)> = None;
    let mut matched = 0usize;
    let mut skipped = 0usize;

    for reading in readings
        .iter()
        .filter(|r| r.metric_type == request.metric_type && r.recorded_at >= cutoff)
    {
        matched += 1;
        let day = reading.recorded_at.with_timezone(&zone).date_naive();
        let bucket = buckets.entry(day).or_default();

        match (blood_pressure, reading.value) {
            (true, MetricValue::BloodPressure { systolic, diastolic }) => {
                bucket.systolic.push(systolic);
                bucket.diastolic.push(diastolic);
            }
            (false, MetricValue::Numeric { value }) => bucket.values.push(value),
            _ => skipped += 1,
        }

        if earliest.map_or(true, |(at, _)| reading.recorded_at < at) {
            earliest = Some((reading.recorded_at, reading.unit.as_str()));
        }
    }

    let unit = match earliest {
        Some((_, unit)) if !unit.is_empty() => unit,
        _ => request.metric_type.default_unit(),
    };

    debug!(
        "Built {} series over {} days: {} readings in {} buckets, {} unparsed",
        request.metric_type,
        request.window_days,
        matched,
        buckets.len(),
        skipped
    );

    Ok(buckets
        .into_iter()
        .map(|(day, bucket)| ChartPoint::new(day, bucket.into_point_value(blood_pressure, unit)))
        .collect())
}

/// Arithmetic mean, zero for an empty slice
fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

fn mean_i32(values: &[i32]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().map(|&v| f64::from(v)).sum::<f64>() / values.len() as f64
}

/// Round to one decimal digit
fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
