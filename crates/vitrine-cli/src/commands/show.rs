//! Show command implementation

use anyhow::{Context, Result};
use vitrine_core::SiteConfig;

use crate::output::{OutputFormat, PageView, print_page};

/// Execute the show command
pub async fn execute(
    config: &SiteConfig,
    fragment: Option<&str>,
    format: OutputFormat,
    warm: bool,
) -> Result<()> {
    let mut site = super::connect(config, fragment).await?;

    let navigation = site
        .navigate(None)
        .await
        .with_context(|| format!("Failed to show '{}'", site.location().href()))?;

    if warm {
        let report = site.warm_all().wait().await;
        for (page, reason) in &report.failed {
            tracing::warn!("Could not warm '{page}': {reason}");
        }
    }

    let view = PageView {
        navigation: &navigation,
        shell: site.shell().snapshot(),
    };
    print_page(&view, format)
}
