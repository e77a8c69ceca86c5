// Repository module structure
pub mod errors;
mod in_memory;
mod metrics;

// Re-export commonly used types
pub use errors::RepositoryError;
pub use in_memory::InMemoryMetricsRepository;
pub use metrics::{ApiMetricsRepository, MetricsQuery, MetricsRepositoryTrait, DEFAULT_METRICS_LIMIT};

// Re-export test modules for both testing and when mock feature is enabled
#[cfg(any(test, feature = "mock"))]
pub use metrics::tests;
