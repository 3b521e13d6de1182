//! Configuration loading and the visitor's starting address.

use anyhow::{Context, Result};
use tracing::debug;
use vitrine_core::{Location, SiteConfig};

use crate::cli::Cli;

/// Resolve the site configuration: file, then environment, then flags.
pub fn load_config(cli: &Cli) -> Result<SiteConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let mut config = SiteConfig::from_path(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?;
            config.apply_env_overrides();
            config
        },
        None => SiteConfig::load().context("Failed to load configuration")?,
    };

    if let Some(url) = &cli.base_url {
        config.site.base_url.clone_from(url);
    }

    config.validate().context("Invalid configuration")?;
    debug!("Using site at {}", config.site.base_url);
    Ok(config)
}

/// Address of the shell with `fragment` appended.
///
/// A fragment without its leading `#` is taken as a page name, so `about`
/// and `#/about` are equivalent.
pub fn starting_location(config: &SiteConfig, fragment: Option<&str>) -> Location {
    let base = &config.site.base_url;
    let separator = if base.ends_with('/') { "" } else { "/" };
    let fragment = match fragment.map(str::trim) {
        None | Some("") => String::new(),
        Some(f) if f.starts_with('#') => f.to_string(),
        Some(f) => format!("#/{f}"),
    };
    Location::new(format!("{base}{separator}{}{fragment}", config.site.shell))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starting_location() {
        let config = SiteConfig::default();
        assert_eq!(
            starting_location(&config, None).href(),
            "http://127.0.0.1:8080/index.html"
        );
        assert_eq!(
            starting_location(&config, Some("about")).hash(),
            "#/about"
        );
        assert_eq!(
            starting_location(&config, Some("#equipe")).hash(),
            "#equipe"
        );
    }

    #[test]
    fn test_base_url_without_trailing_slash() {
        let mut config = SiteConfig::default();
        config.site.base_url = "http://localhost:3000".into();
        assert_eq!(
            starting_location(&config, Some("#/contact")).href(),
            "http://localhost:3000/index.html#/contact"
        );
    }
}
