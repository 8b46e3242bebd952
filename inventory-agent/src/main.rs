//! Inventory Agent - one collection pass per invocation
//!
//! Loads the configuration, probes the host and every enabled feature, then
//! writes the report as JSON to the configured file or to stdout.

use anyhow::{Context, Result};
use inventory_agent::logging::init_logging;
use inventory_agent::{Configuration, Fetcher, HostReport, HostReportBuilder, LinuxFetcher, Platform};
use std::sync::Arc;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Configuration::load().await.context("Failed to load configuration")?;
    init_logging(config.verbose);

    info!("Inventory Agent v{} starting...", env!("CARGO_PKG_VERSION"));

    let fetcher: Arc<dyn Fetcher> = Arc::new(LinuxFetcher::new(&config));
    let builder = HostReportBuilder::new(fetcher, config.clone(), Platform::detect());

    let report = match builder.run().await {
        Ok(report) => report,
        Err(e) => {
            error!("Fatal: {}", e);
            std::process::exit(1);
        }
    };

    write_report(&report, &config.output_path).await
}

async fn write_report(report: &HostReport, output_path: &str) -> Result<()> {
    let json = serde_json::to_string_pretty(report).context("Failed to serialize report")?;

    if output_path.is_empty() {
        println!("{}", json);
    } else {
        tokio::fs::write(output_path, json)
            .await
            .with_context(|| format!("Failed to write report to {}", output_path))?;
        info!("Report written to {}", output_path);
    }
    Ok(())
}
