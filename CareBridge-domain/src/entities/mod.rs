// Domain entities and value objects
pub mod conversions;
pub mod insights;
pub mod metric;
pub mod series;

// Re-export common types for easier imports
pub use insights::{BloodPressureCategory, LatestTile, RangeStatus};
pub use metric::{CreateReadingRequest, MetricType, MetricValue, Reading};
pub use series::{ChartPoint, PointValue, SeriesRequest, PERIOD_OPTIONS};
