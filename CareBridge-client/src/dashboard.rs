//! Dashboard view model
//!
//! Owns the selected metric and period and decides which aggregation result
//! is current. Every selection change or refresh starts a new generation;
//! results computed for an older generation are dropped by the caller.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use care_bridge_domain::entities::{MetricType, SeriesRequest, PERIOD_OPTIONS};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DashboardError {
    #[error("Period must be at least 1 day, got {0}")]
    InvalidPeriod(u32),

    #[error("Metric type is required")]
    EmptyMetric,
}

/// Identifies the refresh a result belongs to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshTicket {
    generation: u64,
    metric: MetricType,
    period_days: u32,
}

impl RefreshTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Series parameters captured when the refresh started
    pub fn series_request(&self) -> SeriesRequest {
        SeriesRequest::new(self.metric.clone(), self.period_days)
    }
}

/// Selection state of the metrics dashboard
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardState {
    selected_metric: MetricType,
    selected_period: u32,
    #[serde(skip)]
    generation: u64,
}

impl Default for DashboardState {
    fn default() -> Self {
        Self {
            selected_metric: MetricType::Heartbeat,
            selected_period: PERIOD_OPTIONS[0],
            generation: 0,
        }
    }
}

impl DashboardState {
    pub fn new(metric: MetricType, period_days: u32) -> Result<Self, DashboardError> {
        let mut state = Self::default();
        state.select_metric(metric)?;
        state.select_period(period_days)?;
        Ok(state)
    }

    /// Window lengths offered for selection
    pub fn period_options() -> &'static [u32] {
        &PERIOD_OPTIONS
    }

    pub fn selected_metric(&self) -> &MetricType {
        &self.selected_metric
    }

    pub fn selected_period(&self) -> u32 {
        self.selected_period
    }

    pub fn select_metric(&mut self, metric: MetricType) -> Result<(), DashboardError> {
        if metric.as_str().trim().is_empty() {
            return Err(DashboardError::EmptyMetric);
        }
        if metric != self.selected_metric {
            debug!("Metric changed: {} -> {}", self.selected_metric, metric);
            self.selected_metric = metric;
            self.generation += 1;
        }
        Ok(())
    }

    pub fn select_period(&mut self, days: u32) -> Result<(), DashboardError> {
        if days == 0 {
            return Err(DashboardError::InvalidPeriod(days));
        }
        if days != self.selected_period {
            debug!("Period changed: {}d -> {}d", self.selected_period, days);
            self.selected_period = days;
            self.generation += 1;
        }
        Ok(())
    }

    /// Start a refresh for the current selection
    ///
    /// Supersedes every ticket issued before.
    pub fn begin_refresh(&mut self) -> RefreshTicket {
        self.generation += 1;
        RefreshTicket {
            generation: self.generation,
            metric: self.selected_metric.clone(),
            period_days: self.selected_period,
        }
    }

    /// Whether a result computed for `ticket` is still current
    pub fn accept(&self, ticket: &RefreshTicket) -> bool {
        ticket.generation == self.generation
    }
}
