use async_trait::async_trait;
use tracing::{debug, error};

use super::errors::RepositoryError;
use crate::api::ApiClient;
use crate::models::{CreateMetricRequest, MetricRecord};

/// Default record-count cap for a metrics fetch
pub const DEFAULT_METRICS_LIMIT: usize = 10_000;

/// Which metric records to fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricsQuery {
    /// `None` for the logged-in patient, `Some` for a doctor viewing a patient
    pub patient_id: Option<i64>,
    /// Restrict to one metric key
    pub metric_type: Option<String>,
    /// Upper bound on returned records
    pub limit: usize,
}

impl Default for MetricsQuery {
    fn default() -> Self {
        Self::own(DEFAULT_METRICS_LIMIT)
    }
}

impl MetricsQuery {
    /// The logged-in patient's own metrics
    pub fn own(limit: usize) -> Self {
        Self {
            patient_id: None,
            metric_type: None,
            limit,
        }
    }

    /// An assigned patient's metrics, as a doctor
    pub fn for_patient(patient_id: i64, limit: usize) -> Self {
        Self {
            patient_id: Some(patient_id),
            metric_type: None,
            limit,
        }
    }

    pub fn with_metric_type(mut self, metric_type: impl Into<String>) -> Self {
        self.metric_type = Some(metric_type.into());
        self
    }

    pub(crate) fn check(&self) -> Result<(), RepositoryError> {
        if self.limit == 0 {
            return Err(RepositoryError::Validation(
                "limit must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Repository trait for health metric records
#[async_trait]
pub trait MetricsRepositoryTrait {
    /// Fetch records, newest first, at most `query.limit`
    async fn fetch(&self, query: &MetricsQuery) -> Result<Vec<MetricRecord>, RepositoryError>;

    /// Record a new metric
    async fn add(&self, request: CreateMetricRequest) -> Result<MetricRecord, RepositoryError>;
}

/// Repository backed by the REST API
#[derive(Debug, Clone)]
pub struct ApiMetricsRepository {
    client: ApiClient,
}

impl ApiMetricsRepository {
    /// Create a new repository over `client`
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl MetricsRepositoryTrait for ApiMetricsRepository {
    async fn fetch(&self, query: &MetricsQuery) -> Result<Vec<MetricRecord>, RepositoryError> {
        query.check()?;
        let metric_type = query.metric_type.as_deref();

        let result = match query.patient_id {
            Some(patient_id) => {
                debug!("Fetching metrics for patient {} from API", patient_id);
                self.client
                    .get_patient_health_metrics(patient_id, metric_type, query.limit)
                    .await
            }
            None => {
                debug!("Fetching own metrics from API");
                self.client.get_health_metrics(metric_type, query.limit).await
            }
        };

        result.map_err(|e| {
            error!("Failed to fetch metrics: {}", e);
            RepositoryError::from(e)
        })
    }

    async fn add(&self, request: CreateMetricRequest) -> Result<MetricRecord, RepositoryError> {
        self.client
            .add_health_metric(&request)
            .await
            .map_err(RepositoryError::from)
    }
}

/// Mock metrics repositories for testing
#[cfg(any(test, feature = "mock"))]
pub mod tests {
    use super::*;

    /// Repository whose every call fails with a fixed error kind
    #[derive(Debug, Clone)]
    pub struct FailingMetricsRepository {
        unauthorized: bool,
    }

    impl FailingMetricsRepository {
        /// Fail with an API error
        pub fn new() -> Self {
            Self { unauthorized: false }
        }

        /// Fail as if the token had expired
        pub fn unauthorized() -> Self {
            Self { unauthorized: true }
        }

        fn error(&self) -> RepositoryError {
            if self.unauthorized {
                RepositoryError::Unauthorized("Invalid or expired token".to_string())
            } else {
                RepositoryError::Client(crate::api::DataError::Api {
                    status: 500,
                    message: "Internal server error".to_string(),
                })
            }
        }
    }

    impl Default for FailingMetricsRepository {
        fn default() -> Self {
            Self::new()
        }
    }

    #[async_trait]
    impl MetricsRepositoryTrait for FailingMetricsRepository {
        async fn fetch(&self, _query: &MetricsQuery) -> Result<Vec<MetricRecord>, RepositoryError> {
            Err(self.error())
        }

        async fn add(&self, _request: CreateMetricRequest) -> Result<MetricRecord, RepositoryError> {
            Err(self.error())
        }
    }

    #[test]
    fn test_query_builders() {
        let query = MetricsQuery::default();
        assert_eq!(query.limit, DEFAULT_METRICS_LIMIT);
        assert_eq!(query.patient_id, None);

        let query = MetricsQuery::for_patient(3, 50).with_metric_type("steps");
        assert_eq!(query.patient_id, Some(3));
        assert_eq!(query.metric_type.as_deref(), Some("steps"));
        assert!(query.check().is_ok());
        assert!(MetricsQuery::own(0).check().is_err());
    }
}
