use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, instrument, warn};
use validator::Validate;

use super::DataError;
use crate::models::{
    CreateMetricRequest, CreateMetricResponse, LoginRequest, LoginResponse, MetricRecord,
    MetricsResponse, Session,
};
use crate::session::SessionStore;
use crate::validation::describe_validation_errors;

/// Supplies the bearer token for each request, if any
pub type TokenProvider = Arc<dyn Fn() -> Option<String> + Send + Sync>;

/// Invoked when the API answers 401
pub type UnauthorizedHandler = Arc<dyn Fn() + Send + Sync>;

/// Default request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration for [`ApiClient`]
#[derive(Clone)]
pub struct ApiConfig {
    /// Base URL including the API prefix, e.g. `http://localhost:5000/api`
    pub base_url: String,
    /// Token source consulted on every request
    pub token_provider: TokenProvider,
    /// Side effect for expired or rejected tokens
    pub on_unauthorized: UnauthorizedHandler,
    /// Per-request timeout
    pub timeout: Duration,
}

impl ApiConfig {
    /// Anonymous configuration for the given base URL
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token_provider: Arc::new(|| None),
            on_unauthorized: Arc::new(|| {}),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_token_provider(mut self, provider: TokenProvider) -> Self {
        self.token_provider = provider;
        self
    }

    pub fn with_on_unauthorized(mut self, handler: UnauthorizedHandler) -> Self {
        self.on_unauthorized = handler;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Read tokens from `store` and clear it when the API rejects them
    pub fn with_session_store(self, store: Arc<dyn SessionStore>) -> Self {
        let token_store = Arc::clone(&store);
        let provider: TokenProvider = Arc::new(move || match token_store.load() {
            Ok(session) => session.map(|s| s.access_token),
            Err(e) => {
                warn!("Failed to load session for request: {}", e);
                None
            }
        });
        let handler: UnauthorizedHandler = Arc::new(move || {
            if let Err(e) = store.clear() {
                warn!("Failed to clear session after 401: {}", e);
            }
        });
        self.with_token_provider(provider).with_on_unauthorized(handler)
    }
}

impl fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiConfig")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    error: Option<String>,
    message: Option<String>,
}

/// REST client for the CareBridge API
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    config: ApiConfig,
}

impl ApiClient {
    /// Build a client; fails on a malformed base URL
    pub fn new(config: ApiConfig) -> Result<Self, DataError> {
        let base = config.base_url.trim();
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(DataError::Config(format!(
                "Base URL must start with http:// or https://, got '{}'",
                config.base_url
            )));
        }

        let http = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim().trim_end_matches('/'), path)
    }

    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        match (self.config.token_provider)() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, DataError> {
        let response = self.authorize(builder).send().await?;
        let status = response.status();

        if status.is_success() {
            return Ok(response.json::<T>().await?);
        }

        let body = response.text().await.unwrap_or_default();
        let message = error_message(status, &body);

        if status == StatusCode::UNAUTHORIZED {
            warn!("API rejected credentials: {}", message);
            (self.config.on_unauthorized)();
            return Err(DataError::Unauthorized(message));
        }

        debug!("API returned {}: {}", status, message);
        Err(DataError::Api {
            status: status.as_u16(),
            message,
        })
    }

    /// Exchange credentials for a session
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn login(&self, request: &LoginRequest) -> Result<Session, DataError> {
        let builder = self.http.post(self.url("/auth/login")).json(request);
        let response: LoginResponse = self.send(builder).await?;
        Ok(response.into())
    }

    /// Metrics of the logged-in patient, newest first, at most `limit`
    #[instrument(skip(self))]
    pub async fn get_health_metrics(
        &self,
        metric_type: Option<&str>,
        limit: usize,
    ) -> Result<Vec<MetricRecord>, DataError> {
        let builder = self
            .http
            .get(self.url("/patient/health-metrics"))
            .query(&metrics_params(metric_type, limit));
        let response: MetricsResponse = self.send(builder).await?;
        debug!("Fetched {} metric records", response.metrics.len());
        Ok(response.metrics)
    }

    /// Metrics of an assigned patient, as seen by a doctor
    #[instrument(skip(self))]
    pub async fn get_patient_health_metrics(
        &self,
        patient_id: i64,
        metric_type: Option<&str>,
        limit: usize,
    ) -> Result<Vec<MetricRecord>, DataError> {
        let path = format!("/doctor/patients/{}/health-metrics", patient_id);
        let builder = self
            .http
            .get(self.url(&path))
            .query(&metrics_params(metric_type, limit));
        let response: MetricsResponse = self.send(builder).await?;
        debug!(
            "Fetched {} metric records for patient {}",
            response.metrics.len(),
            patient_id
        );
        Ok(response.metrics)
    }

    /// Record a new metric for the logged-in patient
    #[instrument(skip(self, request), fields(metric_type = %request.metric_type))]
    pub async fn add_health_metric(
        &self,
        request: &CreateMetricRequest,
    ) -> Result<MetricRecord, DataError> {
        request
            .validate()
            .map_err(|e| DataError::Validation(describe_validation_errors(&e)))?;

        let builder = self
            .http
            .post(self.url("/patient/health-metrics"))
            .json(request);
        let response: CreateMetricResponse = self.send(builder).await?;
        Ok(response.metric)
    }
}

fn metrics_params(metric_type: Option<&str>, limit: usize) -> Vec<(&'static str, String)> {
    let mut params = vec![("limit", limit.to_string())];
    if let Some(metric_type) = metric_type {
        params.push(("type", metric_type.to_string()));
    }
    params
}

fn error_message(status: StatusCode, body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.error.or(b.message))
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("Unknown error")
                .to_string()
        })
}
