// Testing utilities and mock implementations for the domain layer
// This module is only available when the "mock" feature is enabled

// Re-export useful test mocks from the data layer
pub use care_bridge_data::repository::tests::FailingMetricsRepository;

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::entities::{ChartPoint, CreateReadingRequest, LatestTile, MetricType, Reading, SeriesRequest};
use crate::services::insights::assess_latest;
use crate::services::metrics::{MetricsServiceError, MetricsServiceTrait};
use crate::services::{build_series, latest_by_type};
use care_bridge_data::repository::MetricsQuery;

/// Mock implementation of the MetricsServiceTrait for testing
///
/// Aggregates in UTC over an in-process reading list.
pub struct MockMetricsService {
    readings: RwLock<Vec<Reading>>,
    should_fail_loading: bool,
    should_fail_recording: bool,
}

impl Default for MockMetricsService {
    fn default() -> Self {
        Self::new()
    }
}

impl MockMetricsService {
    /// Create a new mock metrics service
    pub fn new() -> Self {
        Self {
            readings: RwLock::new(Vec::new()),
            should_fail_loading: false,
            should_fail_recording: false,
        }
    }

    /// Configure the mock to fail loading
    pub fn with_load_failure(mut self) -> Self {
        self.should_fail_loading = true;
        self
    }

    /// Configure the mock to fail recording
    pub fn with_record_failure(mut self) -> Self {
        self.should_fail_recording = true;
        self
    }

    /// Add a pre-defined reading to the mock
    pub fn with_reading(self, reading: Reading) -> Self {
        self.with_readings(vec![reading])
    }

    /// Add multiple pre-defined readings to the mock
    pub fn with_readings(mut self, readings: Vec<Reading>) -> Self {
        if let Ok(store) = self.readings.get_mut() {
            store.extend(readings);
        }
        self
    }

    fn lock_error<T>(err: std::sync::PoisonError<T>) -> MetricsServiceError {
        MetricsServiceError::RepositoryError(err.to_string())
    }
}

#[async_trait]
impl MetricsServiceTrait for MockMetricsService {
    fn validate_series_request(&self, request: &SeriesRequest) -> Result<(), MetricsServiceError> {
        request.check().map_err(MetricsServiceError::from)
    }

    fn latest_by_type(&self, readings: &[Reading]) -> HashMap<MetricType, Reading> {
        latest_by_type(readings)
    }

    fn latest_tiles(&self, readings: &[Reading]) -> Vec<LatestTile> {
        let mut latest: Vec<Reading> = latest_by_type(readings).into_values().collect();
        latest.sort_by(|a, b| a.metric_type.cmp(&b.metric_type));
        latest.iter().map(assess_latest).collect()
    }

    fn build_series(
        &self,
        readings: &[Reading],
        request: &SeriesRequest,
        now: DateTime<Utc>,
    ) -> Result<Vec<ChartPoint>, MetricsServiceError> {
        Ok(build_series(readings, request, &now)?)
    }

    async fn load_readings(&self, query: &MetricsQuery) -> Result<Vec<Reading>, MetricsServiceError> {
        if self.should_fail_loading {
            return Err(MetricsServiceError::RepositoryError(
                "Repository error - mock is configured to fail loading".to_string(),
            ));
        }

        let readings = self.readings.read().map_err(Self::lock_error)?;
        let mut matching: Vec<Reading> = readings
            .iter()
            .filter(|r| match &query.metric_type {
                Some(metric_type) => r.metric_type.as_str() == metric_type,
                None => true,
            })
            .cloned()
            .collect();

        matching.sort_by(|a, b| b.recorded_at.cmp(&a.recorded_at));
        matching.truncate(query.limit);
        Ok(matching)
    }

    async fn record_metric(&self, request: CreateReadingRequest) -> Result<Reading, MetricsServiceError> {
        if self.should_fail_recording {
            return Err(MetricsServiceError::RepositoryError(
                "Repository error - mock is configured to fail recording".to_string(),
            ));
        }

        let mut readings = self.readings.write().map_err(Self::lock_error)?;
        let id = readings.iter().filter_map(|r| r.id).max().unwrap_or(0) + 1;
        let unit = request
            .unit
            .unwrap_or_else(|| request.metric_type.default_unit().to_string());

        let mut reading = Reading::new(request.metric_type, request.value, unit, Utc::now()).with_id(id);
        reading.notes = request.notes;
        readings.push(reading.clone());

        Ok(reading)
    }
}
