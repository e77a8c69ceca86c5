use thiserror::Error;

use crate::config::ConfigError;
use crate::dashboard::DashboardError;
use care_bridge_data::api::DataError;
use care_bridge_data::repository::RepositoryError;
use care_bridge_domain::services::MetricsServiceError;

/// Errors surfaced by the client front end
#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Dashboard(#[from] DashboardError),

    /// API client construction, login or session storage failed
    #[error(transparent)]
    Data(#[from] DataError),

    /// Offline readings could not be loaded
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Service(#[from] MetricsServiceError),

    /// A newer refresh started before this one finished
    #[error("Refresh superseded by a newer selection")]
    Superseded,
}
