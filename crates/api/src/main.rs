//! Impact Dashboard - Main Entry Point

use api::{init_logging, init_metrics, run_server, AppConfig};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    init_logging(&config.logging);

    info!("=== Impact Dashboard v{} ===", env!("CARGO_PKG_VERSION"));
    info!(
        "Reading source: {:?}, log capacity: {}",
        config.ingestion.source, config.monitor.log_capacity
    );

    init_metrics(&config.metrics)?;
    run_server(config).await?;

    Ok(())
}
