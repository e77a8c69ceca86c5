use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Local, TimeZone, Utc};
use thiserror::Error;
use tracing::{error, info, instrument};

use crate::entities::conversions;
use crate::entities::{ChartPoint, CreateReadingRequest, LatestTile, MetricType, Reading, SeriesRequest};
use crate::services::aggregator::{self, AggregationError};
use crate::services::insights::assess_latest;
use care_bridge_data::api::ApiClient;
use care_bridge_data::repository::{
    ApiMetricsRepository, InMemoryMetricsRepository, MetricsQuery, MetricsRepositoryTrait,
    RepositoryError,
};

/// Metrics service errors
#[derive(Debug, Error)]
pub enum MetricsServiceError {
    /// Validation error
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Session missing or expired
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Repository error
    #[error("Repository error: {0}")]
    RepositoryError(String),
}

impl From<AggregationError> for MetricsServiceError {
    fn from(error: AggregationError) -> Self {
        match error {
            AggregationError::InvalidRequest(msg) => MetricsServiceError::ValidationError(msg),
        }
    }
}

/// Trait for health metric service operations
#[async_trait]
pub trait MetricsServiceTrait {
    /// Validate a series request before aggregating
    fn validate_series_request(&self, request: &SeriesRequest) -> Result<(), MetricsServiceError>;

    /// Latest reading per metric type
    fn latest_by_type(&self, readings: &[Reading]) -> HashMap<MetricType, Reading>;

    /// Latest-value tiles, known metrics first in display order
    fn latest_tiles(&self, readings: &[Reading]) -> Vec<LatestTile>;

    /// Daily averaged series for one metric, bucketed in the service's zone
    fn build_series(
        &self,
        readings: &[Reading],
        request: &SeriesRequest,
        now: DateTime<Utc>,
    ) -> Result<Vec<ChartPoint>, MetricsServiceError>;

    /// Fetch and ingest readings
    async fn load_readings(&self, query: &MetricsQuery) -> Result<Vec<Reading>, MetricsServiceError>;

    /// Record a new reading
    async fn record_metric(&self, request: CreateReadingRequest) -> Result<Reading, MetricsServiceError>;
}

/// Metrics service over a record repository
pub struct MetricsService<R: MetricsRepositoryTrait, Tz: TimeZone = Local> {
    repository: R,
    zone: Tz,
}

impl<R: MetricsRepositoryTrait> MetricsService<R, Local> {
    /// Create a new metrics service bucketing days in the system zone
    pub fn new(repository: R) -> Self {
        Self {
            repository,
            zone: Local,
        }
    }
}

impl<R: MetricsRepositoryTrait, Tz: TimeZone> MetricsService<R, Tz> {
    /// Bucket days in `zone` instead
    pub fn with_zone<Z: TimeZone>(self, zone: Z) -> MetricsService<R, Z> {
        MetricsService {
            repository: self.repository,
            zone,
        }
    }

    /// Map repository errors to service errors
    fn map_repo_error(&self, err: RepositoryError) -> MetricsServiceError {
        match err {
            RepositoryError::Validation(msg) => MetricsServiceError::ValidationError(msg),
            RepositoryError::Unauthorized(msg) => MetricsServiceError::Unauthorized(msg),
            _ => MetricsServiceError::RepositoryError(err.to_string()),
        }
    }
}

#[async_trait]
impl<R, Tz> MetricsServiceTrait for MetricsService<R, Tz>
where
    R: MetricsRepositoryTrait + Send + Sync,
    Tz: TimeZone + Send + Sync,
{
    fn validate_series_request(&self, request: &SeriesRequest) -> Result<(), MetricsServiceError> {
        request.check().map_err(MetricsServiceError::from)
    }

    fn latest_by_type(&self, readings: &[Reading]) -> HashMap<MetricType, Reading> {
        aggregator::latest_by_type(readings)
    }

    fn latest_tiles(&self, readings: &[Reading]) -> Vec<LatestTile> {
        let mut latest: Vec<Reading> = aggregator::latest_by_type(readings).into_values().collect();
        // MetricType orders known variants first, then other keys alphabetically
        latest.sort_by(|a, b| a.metric_type.cmp(&b.metric_type));
        latest.iter().map(assess_latest).collect()
    }

    fn build_series(
        &self,
        readings: &[Reading],
        request: &SeriesRequest,
        now: DateTime<Utc>,
    ) -> Result<Vec<ChartPoint>, MetricsServiceError> {
        let now = now.with_timezone(&self.zone);
        Ok(aggregator::build_series(readings, request, &now)?)
    }

    #[instrument(skip(self))]
    async fn load_readings(&self, query: &MetricsQuery) -> Result<Vec<Reading>, MetricsServiceError> {
        let records = self
            .repository
            .fetch(query)
            .await
            .map_err(|e| self.map_repo_error(e))?;

        let fetched = records.len();
        let readings = conversions::convert_to_domain_readings(records);
        info!("Loaded {} readings ({} records fetched)", readings.len(), fetched);

        Ok(readings)
    }

    #[instrument(skip(self, request), fields(metric_type = %request.metric_type))]
    async fn record_metric(&self, request: CreateReadingRequest) -> Result<Reading, MetricsServiceError> {
        if request.value.trim().is_empty() {
            return Err(MetricsServiceError::ValidationError(
                "value: Value is required".to_string(),
            ));
        }

        let data_request = conversions::convert_to_data_create_request(&request);

        let record = self
            .repository
            .add(data_request)
            .await
            .map_err(|e| self.map_repo_error(e))?;

        conversions::convert_to_domain_reading(record).ok_or_else(|| {
            error!("Created metric came back without a type or timestamp");
            MetricsServiceError::RepositoryError(
                "Created metric is missing its type or timestamp".to_string(),
            )
        })
    }
}

/// Create a metrics service over the REST API
pub fn create_api_metrics_service(client: ApiClient) -> impl MetricsServiceTrait + Send + Sync {
    MetricsService::new(ApiMetricsRepository::new(client))
}

/// Create a metrics service over readings held in memory
pub fn create_offline_metrics_service(
    repository: InMemoryMetricsRepository,
) -> impl MetricsServiceTrait + Send + Sync {
    MetricsService::new(repository)
}

/// Create a mock metrics service for testing
/// This function is only available when the mock feature is enabled
#[cfg(feature = "mock")]
pub fn create_mock_metrics_service() -> impl MetricsServiceTrait + Send + Sync {
    crate::testing::MockMetricsService::new()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{MetricValue, PointValue, RangeStatus};
    use care_bridge_data::models::MetricRecord;
    use care_bridge_data::repository::tests::FailingMetricsRepository;
    use chrono::FixedOffset;

    fn record(id: i64, metric_type: &str, value: &str, at: &str) -> MetricRecord {
        MetricRecord {
            id: Some(id),
            patient_id: Some(1),
            metric_type: Some(metric_type.to_string()),
            value: Some(value.to_string()),
            unit: None,
            recorded_at: Some(at.to_string()),
            notes: None,
        }
    }

    fn sample_service() -> MetricsService<InMemoryMetricsRepository, Utc> {
        let repository = InMemoryMetricsRepository::from_records(vec![
            record(1, "heartbeat", "72", "2024-05-01T09:00:00"),
            record(2, "heartbeat", "76", "2024-05-01T21:00:00"),
            record(3, "heartbeat", "80", "2024-05-02T09:00:00"),
            record(4, "blood_pressure", "120/80", "2024-05-01T08:00:00"),
            record(5, "mood", "ok", "2024-05-02T08:00:00"),
            record(6, "steps", "9000", "2024-05-02T20:00:00"),
            MetricRecord {
                recorded_at: None,
                ..record(7, "heartbeat", "99", "")
            },
        ]);
        MetricsService::new(repository).with_zone(Utc)
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 2, 12, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn test_load_readings_drops_undated_records() {
        let service = sample_service();
        let readings = service.load_readings(&MetricsQuery::default()).await.unwrap();
        assert_eq!(readings.len(), 6);
        assert!(readings.iter().all(|r| r.id != Some(7)));
    }

    #[tokio::test]
    async fn test_build_series_from_loaded_readings() {
        let service = sample_service();
        let readings = service.load_readings(&MetricsQuery::default()).await.unwrap();

        let request = SeriesRequest::new(MetricType::Heartbeat, 7);
        let series = service.build_series(&readings, &request, now()).unwrap();

        assert_eq!(series.len(), 2);
        assert!(matches!(series[0].value, PointValue::Numeric { value, .. } if value == 74.0));
        assert!(matches!(series[1].value, PointValue::Numeric { value, .. } if value == 80.0));
    }

    #[tokio::test]
    async fn test_service_zone_controls_day_boundaries() {
        // 21:00 UTC on May 1 is May 2 at UTC+5
        let service = sample_service().with_zone(FixedOffset::east_opt(5 * 3600).unwrap());
        let readings = service.load_readings(&MetricsQuery::default()).await.unwrap();

        let request = SeriesRequest::new(MetricType::Heartbeat, 7);
        let series = service.build_series(&readings, &request, now()).unwrap();

        assert_eq!(series.len(), 2);
        assert!(matches!(series[0].value, PointValue::Numeric { value, .. } if value == 72.0));
        assert!(matches!(series[1].value, PointValue::Numeric { value, .. } if value == 78.0));
    }

    #[tokio::test]
    async fn test_latest_tiles_order_and_status() {
        let service = sample_service();
        let readings = service.load_readings(&MetricsQuery::default()).await.unwrap();

        let tiles = service.latest_tiles(&readings);
        let order: Vec<&str> = tiles.iter().map(|t| t.metric_type.as_str()).collect();
        assert_eq!(order, vec!["heartbeat", "blood_pressure", "steps", "mood"]);

        assert_eq!(tiles[0].reading.raw_value, "80");
        assert_eq!(tiles[0].status, RangeStatus::Normal);
        assert_eq!(
            tiles[1].reading.value,
            MetricValue::BloodPressure { systolic: 120, diastolic: 80 }
        );
        assert_eq!(tiles[3].label, "Mood");
        assert_eq!(tiles[3].status, RangeStatus::Unknown);
    }

    #[test]
    fn test_validate_series_request() {
        let service = sample_service();
        assert!(service
            .validate_series_request(&SeriesRequest::new(MetricType::Steps, 30))
            .is_ok());

        let result = service.validate_series_request(&SeriesRequest::new(MetricType::Steps, 0));
        assert!(matches!(result, Err(MetricsServiceError::ValidationError(_))));

        let result = service.build_series(&[], &SeriesRequest::new(MetricType::Steps, 0), now());
        assert!(result.unwrap_err().to_string().contains("window_days"));

        assert!(service
            .validate_series_request(&SeriesRequest::new(MetricType::Steps, 5000))
            .is_ok());
    }

    #[tokio::test]
    async fn test_record_metric() {
        let service = sample_service();
        let reading = service
            .record_metric(CreateReadingRequest {
                metric_type: MetricType::Temperature,
                value: "98.6".to_string(),
                unit: None,
                notes: Some("after walk".to_string()),
            })
            .await
            .unwrap();

        assert_eq!(reading.id, Some(8));
        assert_eq!(reading.unit, "°F");
        assert_eq!(reading.value, MetricValue::Numeric { value: 98.6 });

        let readings = service
            .load_readings(&MetricsQuery::default().with_metric_type("temperature"))
            .await
            .unwrap();
        assert_eq!(readings.len(), 1);
    }

    #[tokio::test]
    async fn test_record_metric_requires_value() {
        let service = sample_service();
        let result = service
            .record_metric(CreateReadingRequest {
                metric_type: MetricType::Heartbeat,
                value: "   ".to_string(),
                unit: None,
                notes: None,
            })
            .await;
        assert!(matches!(result, Err(MetricsServiceError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_repository_errors_are_mapped() {
        let service = MetricsService::new(FailingMetricsRepository::unauthorized());
        let result = service.load_readings(&MetricsQuery::default()).await;
        assert!(matches!(result, Err(MetricsServiceError::Unauthorized(_))));

        let service = MetricsService::new(FailingMetricsRepository::new());
        let result = service.load_readings(&MetricsQuery::default()).await;
        let err = result.unwrap_err();
        assert!(matches!(err, MetricsServiceError::RepositoryError(_)));
        assert!(err.to_string().contains("Internal server error"));

        let service = sample_service();
        let result = service.load_readings(&MetricsQuery::own(0)).await;
        assert!(matches!(result, Err(MetricsServiceError::ValidationError(_))));
    }
}
