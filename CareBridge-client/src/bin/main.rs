use anyhow::Context;
use dotenv::dotenv;
use tracing::{debug, error, info};

use care_bridge_client::{app, logging, ClientConfig};

/// Entry point for the CareBridge metrics dashboard
///
/// Loads `.env`, reads the configuration, refreshes the dashboard once and
/// prints the report as JSON on stdout.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load before logging so RUST_LOG can come from .env
    let dotenv_loaded = dotenv().is_ok();
    logging::init();
    if !dotenv_loaded {
        debug!(".env file not found; using process environment");
    }

    let config = ClientConfig::from_env().context("Invalid configuration")?;

    let report = match app::run(&config).await {
        Ok(report) => report,
        Err(e) => {
            error!("Dashboard refresh failed: {}", e);
            return Err(e).context("Failed to refresh metrics dashboard");
        }
    };

    info!(
        "Aggregated {} readings into {} tiles and {} chart points",
        report.reading_count,
        report.latest.len(),
        report.series.points.len()
    );

    let json = serde_json::to_string_pretty(&report).context("Failed to serialise report")?;
    println!("{}", json);

    Ok(())
}
