use std::cmp::Reverse;
use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;
use tracing::debug;
use validator::Validate;

use super::errors::RepositoryError;
use super::metrics::{MetricsQuery, MetricsRepositoryTrait};
use crate::models::{format_recorded_at, CreateMetricRequest, MetricRecord};
use crate::validation::describe_validation_errors;

/// In-memory storage for metric records
///
/// Backs offline runs (records loaded from a JSON file) and tests.
#[derive(Debug, Clone, Default)]
pub struct InMemoryMetricsRepository {
    /// Records in insertion order
    records: Arc<Mutex<Vec<MetricRecord>>>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RecordsFile {
    Envelope { metrics: Vec<MetricRecord> },
    List(Vec<MetricRecord>),
}

impl InMemoryMetricsRepository {
    /// Create an empty repository
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a repository holding `records`
    pub fn from_records(records: Vec<MetricRecord>) -> Self {
        Self {
            records: Arc::new(Mutex::new(records)),
        }
    }

    /// Load records from JSON, either `{"metrics": [...]}` or a bare array
    pub fn from_json_str(json: &str) -> Result<Self, RepositoryError> {
        let parsed: RecordsFile =
            serde_json::from_str(json).map_err(|e| RepositoryError::Source(e.to_string()))?;
        let records = match parsed {
            RecordsFile::Envelope { metrics } => metrics,
            RecordsFile::List(records) => records,
        };
        debug!("Loaded {} metric records", records.len());
        Ok(Self::from_records(records))
    }

    /// Load records from a JSON file
    pub fn from_json_file(path: &Path) -> Result<Self, RepositoryError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| RepositoryError::Source(format!("{}: {}", path.display(), e)))?;
        Self::from_json_str(&contents)
    }

    /// Number of stored records
    pub fn len(&self) -> Result<usize, RepositoryError> {
        Ok(self.records.lock()?.len())
    }

    pub fn is_empty(&self) -> Result<bool, RepositoryError> {
        Ok(self.len()? == 0)
    }
}

#[async_trait]
impl MetricsRepositoryTrait for InMemoryMetricsRepository {
    async fn fetch(&self, query: &MetricsQuery) -> Result<Vec<MetricRecord>, RepositoryError> {
        query.check()?;
        let store = self.records.lock()?;

        let mut matching: Vec<MetricRecord> = store
            .iter()
            .filter(|record| match query.patient_id {
                // Records without an owner (offline files) belong to whoever asks
                Some(patient_id) => record.patient_id.map_or(true, |p| p == patient_id),
                None => true,
            })
            .filter(|record| match &query.metric_type {
                Some(metric_type) => record.metric_type.as_deref() == Some(metric_type.as_str()),
                None => true,
            })
            .cloned()
            .collect();

        // Newest first like the API; undated records sink to the end
        matching.sort_by_cached_key(|record| Reverse(record.recorded_instant()));
        matching.truncate(query.limit);

        Ok(matching)
    }

    async fn add(&self, request: CreateMetricRequest) -> Result<MetricRecord, RepositoryError> {
        request
            .validate()
            .map_err(|e| RepositoryError::Validation(describe_validation_errors(&e)))?;

        let mut store = self.records.lock()?;
        let next_id = store.iter().filter_map(|r| r.id).max().unwrap_or(0) + 1;

        let record = MetricRecord {
            id: Some(next_id),
            patient_id: None,
            metric_type: Some(request.metric_type),
            value: Some(request.value),
            unit: request.unit,
            recorded_at: Some(format_recorded_at(&Utc::now())),
            notes: request.notes,
        };
        store.push(record.clone());
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: i64, patient: Option<i64>, metric_type: &str, value: &str, at: &str) -> MetricRecord {
        MetricRecord {
            id: Some(id),
            patient_id: patient,
            metric_type: Some(metric_type.to_string()),
            value: Some(value.to_string()),
            unit: None,
            recorded_at: Some(at.to_string()),
            notes: None,
        }
    }

    fn sample_repository() -> InMemoryMetricsRepository {
        InMemoryMetricsRepository::from_records(vec![
            record(1, Some(1), "heartbeat", "72", "2024-05-01T09:00:00"),
            record(2, Some(1), "heartbeat", "80", "2024-05-02T09:00:00"),
            record(3, Some(2), "heartbeat", "65", "2024-05-03T09:00:00"),
            record(4, Some(1), "temperature", "98.4", "2024-05-01T12:00:00"),
            record(5, None, "heartbeat", "90", "2024-04-30T09:00:00"),
        ])
    }

    #[tokio::test]
    async fn test_fetch_orders_newest_first_and_caps() {
        let repo = sample_repository();

        let all = repo.fetch(&MetricsQuery::own(3)).await.unwrap();
        let ids: Vec<i64> = all.iter().filter_map(|r| r.id).collect();
        assert_eq!(ids, vec![3, 2, 4]);
    }

    #[tokio::test]
    async fn test_fetch_filters_type_and_patient() {
        let repo = sample_repository();

        let query = MetricsQuery::for_patient(1, 100).with_metric_type("heartbeat");
        let records = repo.fetch(&query).await.unwrap();
        let ids: Vec<i64> = records.iter().filter_map(|r| r.id).collect();
        assert_eq!(ids, vec![2, 1, 5]);
    }

    #[tokio::test]
    async fn test_fetch_rejects_zero_limit() {
        let repo = sample_repository();
        let result = repo.fetch(&MetricsQuery::own(0)).await;
        assert!(matches!(result, Err(RepositoryError::Validation(_))));
    }

    #[tokio::test]
    async fn test_add_assigns_next_id_and_timestamp() {
        let repo = sample_repository();
        let created = repo
            .add(CreateMetricRequest {
                metric_type: "steps".to_string(),
                value: "8000".to_string(),
                unit: Some("steps".to_string()),
                notes: None,
            })
            .await
            .unwrap();

        assert_eq!(created.id, Some(6));
        assert!(created.recorded_instant().is_some());
        assert_eq!(repo.len().unwrap(), 6);
    }

    #[test]
    fn test_from_json_accepts_envelope_and_list() {
        let envelope = r#"{"metrics": [{"metric_type": "heartbeat", "value": "70", "recorded_at": "2024-05-01T09:00:00"}]}"#;
        assert_eq!(InMemoryMetricsRepository::from_json_str(envelope).unwrap().len().unwrap(), 1);

        let list = r#"[{"metric_type": "heartbeat", "value": 70}, {"metric_type": "steps"}]"#;
        assert_eq!(InMemoryMetricsRepository::from_json_str(list).unwrap().len().unwrap(), 2);

        assert!(matches!(
            InMemoryMetricsRepository::from_json_str("42"),
            Err(RepositoryError::Source(_))
        ));
    }
}
