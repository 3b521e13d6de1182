//! Command implementations for the vitrine CLI

mod browse;
mod show;
mod warm;

pub use browse::execute as browse;
pub use show::execute as show_page;
pub use warm::execute as warm_site;

use anyhow::{Context, Result};
use vitrine_core::{SiteConfig, SiteController};

use crate::utils::settings::starting_location;

/// Fetch the shell and build a controller positioned at `fragment`.
async fn connect(config: &SiteConfig, fragment: Option<&str>) -> Result<SiteController> {
    let location = starting_location(config, fragment);
    SiteController::connect(config, location)
        .await
        .with_context(|| format!("Failed to load the site at {}", config.site.base_url))
}
