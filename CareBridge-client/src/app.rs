use std::sync::Arc;

use chrono::Utc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::config::{ClientConfig, Credentials};
use crate::dashboard::DashboardState;
use crate::error::ClientError;
use crate::report::{build_report, DashboardReport};
use care_bridge_data::api::{ApiClient, ApiConfig};
use care_bridge_data::models::LoginRequest;
use care_bridge_data::repository::{InMemoryMetricsRepository, MetricsQuery};
use care_bridge_data::session::{FileSessionStore, SessionStore};
use care_bridge_domain::services::{
    create_api_metrics_service, create_offline_metrics_service, MetricsServiceTrait,
};

pub type DynMetricsService = Box<dyn MetricsServiceTrait + Send + Sync>;

/// Build an API client that reads and clears the session in `store`
pub fn create_api_client(
    config: &ClientConfig,
    store: Arc<dyn SessionStore>,
) -> Result<ApiClient, ClientError> {
    let api_config = ApiConfig::new(config.api_url.clone())
        .with_timeout(config.timeout)
        .with_session_store(store);
    Ok(ApiClient::new(api_config)?)
}

/// Log in with `credentials` unless `store` already holds a session
pub async fn ensure_session(
    client: &ApiClient,
    store: &dyn SessionStore,
    credentials: Option<&Credentials>,
) -> Result<(), ClientError> {
    if store.load()?.is_some() {
        return Ok(());
    }

    match credentials {
        Some(credentials) => {
            let session = client
                .login(&LoginRequest {
                    email: credentials.email.clone(),
                    password: credentials.password.clone(),
                })
                .await?;
            info!("Logged in as {} ({:?})", session.user.email, session.user.role);
            store.save(&session)?;
        }
        None => warn!("No stored session and no credentials; requests will be anonymous"),
    }
    Ok(())
}

/// Pick the metrics source: the offline readings file when configured, the API otherwise
pub async fn create_metrics_service(config: &ClientConfig) -> Result<DynMetricsService, ClientError> {
    if let Some(path) = &config.readings_file {
        info!("Reading metrics from {}", path.display());
        let repository = InMemoryMetricsRepository::from_json_file(path)?;
        return Ok(Box::new(create_offline_metrics_service(repository)));
    }

    let store: Arc<dyn SessionStore> = Arc::new(FileSessionStore::new(&config.session_file));
    let client = create_api_client(config, Arc::clone(&store))?;
    ensure_session(&client, store.as_ref(), config.credentials.as_ref()).await?;

    Ok(Box::new(create_api_metrics_service(client)))
}

/// Fetch readings and aggregate them for the configured selection
pub async fn run(config: &ClientConfig) -> Result<DashboardReport, ClientError> {
    let service = create_metrics_service(config).await?;
    let state = Mutex::new(DashboardState::new(config.metric.clone(), config.period_days)?);
    refresh(service.as_ref(), &state, config).await
}

/// One dashboard refresh against `service` for the selection held in `state`
///
/// The lock is released while readings load. If the selection changes or
/// another refresh starts meanwhile, this one returns `Superseded`.
pub async fn refresh<S>(
    service: &S,
    state: &Mutex<DashboardState>,
    config: &ClientConfig,
) -> Result<DashboardReport, ClientError>
where
    S: MetricsServiceTrait + Send + Sync + ?Sized,
{
    let ticket = state.lock().await.begin_refresh();

    let query = MetricsQuery {
        patient_id: config.patient_id,
        metric_type: None,
        limit: config.metrics_limit,
    };
    let readings = service.load_readings(&query).await?;

    if !state.lock().await.accept(&ticket) {
        debug!("Dropping results of refresh {}", ticket.generation());
        return Err(ClientError::Superseded);
    }

    Ok(build_report(service, &readings, &ticket, Utc::now())?)
}
