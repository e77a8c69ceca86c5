use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;
use tracing::info;

use care_bridge_data::repository::DEFAULT_METRICS_LIMIT;
use care_bridge_domain::entities::MetricType;

pub const DEFAULT_API_URL: &str = "http://localhost:5000/api";
pub const DEFAULT_SESSION_FILE: &str = ".carebridge/session.json";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_PERIOD_DAYS: u32 = 7;

/// Configuration errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A variable is set but its value is unusable
    #[error("Invalid value '{value}' for {key}: {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },

    /// A variable is required by another one that is set
    #[error("{0} must be set together with {1}")]
    Incomplete(String, String),
}

/// Login credentials used when no session is stored
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

/// Client configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// API base URL including the `/api` prefix
    pub api_url: String,
    /// Where the session is persisted between runs
    pub session_file: PathBuf,
    /// Record-count cap for the metrics fetch
    pub metrics_limit: usize,
    /// Patient to view as a doctor; own metrics when unset
    pub patient_id: Option<i64>,
    /// Metric charted on start
    pub metric: MetricType,
    /// Trailing window in days
    pub period_days: u32,
    /// Offline JSON readings; bypasses the API when set
    pub readings_file: Option<PathBuf>,
    /// Per-request timeout
    pub timeout: Duration,
    /// Optional login credentials
    pub credentials: Option<Credentials>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            session_file: PathBuf::from(DEFAULT_SESSION_FILE),
            metrics_limit: DEFAULT_METRICS_LIMIT,
            patient_id: None,
            metric: MetricType::Heartbeat,
            period_days: DEFAULT_PERIOD_DAYS,
            readings_file: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            credentials: None,
        }
    }
}

impl ClientConfig {
    /// Create a new client configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable source
    ///
    /// Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let defaults = Self::default();

        let api_url = var("CAREBRIDGE_API_URL").unwrap_or(defaults.api_url);
        if !(api_url.starts_with("http://") || api_url.starts_with("https://")) {
            return Err(invalid("CAREBRIDGE_API_URL", &api_url, "expected an http(s) URL"));
        }

        let session_file = var("CAREBRIDGE_SESSION_FILE")
            .map(PathBuf::from)
            .unwrap_or(defaults.session_file);

        let metrics_limit = match var("CAREBRIDGE_METRICS_LIMIT") {
            Some(raw) => match parse::<usize>("CAREBRIDGE_METRICS_LIMIT", &raw)? {
                0 => return Err(invalid("CAREBRIDGE_METRICS_LIMIT", &raw, "must be greater than zero")),
                limit => limit,
            },
            None => defaults.metrics_limit,
        };

        let patient_id = var("CAREBRIDGE_PATIENT_ID")
            .map(|raw| parse::<i64>("CAREBRIDGE_PATIENT_ID", &raw))
            .transpose()?;

        let metric = var("CAREBRIDGE_METRIC")
            .map(MetricType::from)
            .unwrap_or(defaults.metric);

        let period_days = match var("CAREBRIDGE_PERIOD_DAYS") {
            Some(raw) => {
                let days = parse::<u32>("CAREBRIDGE_PERIOD_DAYS", &raw)?;
                if days == 0 {
                    return Err(invalid("CAREBRIDGE_PERIOD_DAYS", &raw, "must be greater than zero"));
                }
                days
            }
            None => defaults.period_days,
        };

        let readings_file = var("CAREBRIDGE_READINGS_FILE").map(PathBuf::from);

        let timeout = match var("CAREBRIDGE_TIMEOUT_SECS") {
            Some(raw) => Duration::from_secs(parse::<u64>("CAREBRIDGE_TIMEOUT_SECS", &raw)?),
            None => defaults.timeout,
        };

        let credentials = match (var("CAREBRIDGE_EMAIL"), var("CAREBRIDGE_PASSWORD")) {
            (Some(email), Some(password)) => Some(Credentials { email, password }),
            (Some(_), None) => {
                return Err(ConfigError::Incomplete(
                    "CAREBRIDGE_PASSWORD".to_string(),
                    "CAREBRIDGE_EMAIL".to_string(),
                ))
            }
            (None, Some(_)) => {
                return Err(ConfigError::Incomplete(
                    "CAREBRIDGE_EMAIL".to_string(),
                    "CAREBRIDGE_PASSWORD".to_string(),
                ))
            }
            (None, None) => None,
        };

        info!(
            "Client configuration: api_url={}, metric={}, period={}d, limit={}, offline={}",
            api_url,
            metric,
            period_days,
            metrics_limit,
            readings_file.is_some()
        );

        Ok(ClientConfig {
            api_url,
            session_file,
            metrics_limit,
            patient_id,
            metric,
            period_days,
            readings_file,
            timeout,
            credentials,
        })
    }
}

fn parse<T: FromStr>(key: &str, raw: &str) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    raw.parse::<T>()
        .map_err(|e| invalid(key, raw, &e.to_string()))
}

fn invalid(key: &str, value: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Result<ClientConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ClientConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config, ClientConfig::default());
        assert_eq!(config.api_url, "http://localhost:5000/api");
        assert_eq!(config.metrics_limit, 10_000);
        assert_eq!(config.metric, MetricType::Heartbeat);
        assert_eq!(config.period_days, 7);
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("CAREBRIDGE_API_URL", "https://care.example.org/api"),
            ("CAREBRIDGE_METRICS_LIMIT", "500"),
            ("CAREBRIDGE_PATIENT_ID", "42"),
            ("CAREBRIDGE_METRIC", "blood_pressure"),
            ("CAREBRIDGE_PERIOD_DAYS", "30"),
            ("CAREBRIDGE_READINGS_FILE", "readings.json"),
            ("CAREBRIDGE_TIMEOUT_SECS", "5"),
            ("CAREBRIDGE_EMAIL", "pat@example.org"),
            ("CAREBRIDGE_PASSWORD", "secret"),
        ])
        .unwrap();

        assert_eq!(config.api_url, "https://care.example.org/api");
        assert_eq!(config.metrics_limit, 500);
        assert_eq!(config.patient_id, Some(42));
        assert_eq!(config.metric, MetricType::BloodPressure);
        assert_eq!(config.period_days, 30);
        assert_eq!(config.readings_file, Some(PathBuf::from("readings.json")));
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.credentials.unwrap().email, "pat@example.org");
    }

    #[test]
    fn test_empty_values_count_as_unset() {
        let config = config_from(&[("CAREBRIDGE_PATIENT_ID", "  "), ("CAREBRIDGE_METRIC", "")]).unwrap();
        assert_eq!(config.patient_id, None);
        assert_eq!(config.metric, MetricType::Heartbeat);
    }

    #[test]
    fn test_invalid_values() {
        let err = config_from(&[("CAREBRIDGE_METRICS_LIMIT", "lots")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "CAREBRIDGE_METRICS_LIMIT"));

        assert!(config_from(&[("CAREBRIDGE_METRICS_LIMIT", "0")]).is_err());
        assert!(config_from(&[("CAREBRIDGE_PERIOD_DAYS", "0")]).is_err());
        assert_eq!(
            config_from(&[("CAREBRIDGE_PERIOD_DAYS", "4000")]).unwrap().period_days,
            4000
        );
        assert!(config_from(&[("CAREBRIDGE_API_URL", "localhost:5000")]).is_err());
        assert!(config_from(&[("CAREBRIDGE_PATIENT_ID", "abc")]).is_err());
    }

    #[test]
    fn test_credentials_must_be_complete() {
        let err = config_from(&[("CAREBRIDGE_EMAIL", "pat@example.org")]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "CAREBRIDGE_PASSWORD must be set together with CAREBRIDGE_EMAIL"
        );
    }

    #[test]
    fn test_credentials_debug_hides_password() {
        let credentials = Credentials {
            email: "pat@example.org".to_string(),
            password: "secret".to_string(),
        };
        assert!(!format!("{:?}", credentials).contains("secret"));
    }
}
