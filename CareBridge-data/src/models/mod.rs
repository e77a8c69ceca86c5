// Wire models exchanged with the CareBridge API
pub mod metric;
pub mod session;

pub use metric::{
    format_recorded_at, parse_recorded_at, CreateMetricRequest, CreateMetricResponse, MetricRecord,
    MetricsResponse,
};
pub use session::{LoginRequest, LoginResponse, Session, SessionUser, UserRole};
