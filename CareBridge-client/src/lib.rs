// CareBridge-client lib.rs
//
// Configuration, dashboard state and the refresh flow behind the
// carebridge-metrics binary.

pub mod app;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod logging;
pub mod report;

pub use config::{ClientConfig, ConfigError};
pub use dashboard::{DashboardState, RefreshTicket};
pub use error::ClientError;
pub use report::DashboardReport;
