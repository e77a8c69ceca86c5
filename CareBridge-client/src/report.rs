use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::dashboard::RefreshTicket;
use care_bridge_domain::entities::{ChartPoint, LatestTile, MetricType, Reading};
use care_bridge_domain::services::{MetricsServiceError, MetricsServiceTrait};

/// Chart section of the dashboard
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesReport {
    pub metric_type: MetricType,
    pub label: String,
    pub window_days: u32,
    pub points: Vec<ChartPoint>,
}

/// Everything the metrics dashboard renders for one refresh
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardReport {
    pub generated_at: DateTime<Utc>,
    pub reading_count: usize,
    pub latest: Vec<LatestTile>,
    pub series: SeriesReport,
}

/// Aggregate `readings` for the selection captured in `ticket`
pub fn build_report<S>(
    service: &S,
    readings: &[Reading],
    ticket: &RefreshTicket,
    now: DateTime<Utc>,
) -> Result<DashboardReport, MetricsServiceError>
where
    S: MetricsServiceTrait + ?Sized,
{
    let request = ticket.series_request();
    service.validate_series_request(&request)?;

    let points = service.build_series(readings, &request, now)?;

    Ok(DashboardReport {
        generated_at: now,
        reading_count: readings.len(),
        latest: service.latest_tiles(readings),
        series: SeriesReport {
            label: request.metric_type.label(),
            metric_type: request.metric_type,
            window_days: request.window_days,
            points,
        },
    })
}
