pub mod aggregator;
pub mod insights;
pub mod metrics;

// Domain services
// Aggregation is pure; the metrics service adds repository access on top.

// Re-export service traits and factory functions
pub use aggregator::{build_series, latest_by_type, AggregationError};
pub use metrics::{
    create_api_metrics_service, create_offline_metrics_service, MetricsService, MetricsServiceError,
    MetricsServiceTrait,
};

// Re-export mock service factory functions when the mock feature is enabled
#[cfg(feature = "mock")]
pub use metrics::create_mock_metrics_service;
