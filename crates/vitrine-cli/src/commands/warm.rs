//! Warm command implementation

use anyhow::{Context, Result};
use tracing::info;
use vitrine_core::SiteConfig;

use crate::output::{OutputFormat, print_warm_up};

/// Execute the warm command
pub async fn execute(config: &SiteConfig, from: Option<&str>, format: OutputFormat) -> Result<()> {
    let mut site = super::connect(config, from).await?;

    let warm_up = site
        .initialize()
        .await
        .context("Failed to show the initial page")?;
    info!("Warming {} page(s)", warm_up.len());

    let report = warm_up.wait().await;
    print_warm_up(&report, format)?;

    if !report.failed.is_empty() {
        anyhow::bail!("{} page(s) failed to warm", report.failed.len());
    }
    Ok(())
}
