//! Configuration for a vitrine site.
//!
//! Settings are stored in TOML and resolved in layers, later layers winning:
//!
//! 1. Built-in defaults ([`SiteConfig::default`])
//! 2. The configuration file: `$VITRINE_CONFIG` if set, otherwise the
//!    platform config directory (`vitrine/config.toml`)
//! 3. Environment variables: `VITRINE_BASE_URL`, `VITRINE_DEFAULT_PAGE`
//! 4. Command-line flags (applied by the CLI)
//!
//! ## Example Configuration File
//!
//! ```toml
//! [site]
//! base_url = "http://127.0.0.1:8080/"
//! name = "Boulangerie Martin"
//! shell = "index.html"
//!
//! [pages]
//! dir = "pages"
//! default = "accueil"
//! not_found = "@404"
//!
//! [fetch]
//! timeout_secs = 30
//! ```
//!
//! ```rust
//! use vitrine_core::SiteConfig;
//!
//! let config: SiteConfig = toml::from_str("[site]\nbase_url = \"http://localhost:3000/\"")?;
//! assert_eq!(config.pages.default, "accueil");
//! config.validate()?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::page_id::{DEFAULT_PAGE, NOT_FOUND_PAGE, PageId};
use crate::{Error, Result};

/// Environment variable naming an explicit configuration file.
pub const CONFIG_ENV: &str = "VITRINE_CONFIG";
/// Environment variable overriding `site.base_url`.
pub const BASE_URL_ENV: &str = "VITRINE_BASE_URL";
/// Environment variable overriding `pages.default`.
pub const DEFAULT_PAGE_ENV: &str = "VITRINE_DEFAULT_PAGE";

/// Complete site configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Where the site lives and how it is named.
    pub site: SiteSection,
    /// Page file layout and reserved identifiers.
    pub pages: PagesSection,
    /// HTTP client settings.
    pub fetch: FetchSection,
}

/// `[site]` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteSection {
    /// Root URL of the static file server.
    pub base_url: String,
    /// Site name used in document titles.
    ///
    /// When unset, the shell's `<title>` at load time is used.
    pub name: Option<String>,
    /// Path of the shell document relative to `base_url`.
    pub shell: String,
}

/// `[pages]` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PagesSection {
    /// Directory holding page files, relative to `base_url`.
    pub dir: String,
    /// Page shown when the fragment names no page.
    pub default: String,
    /// Page shown when a requested page does not exist.
    pub not_found: String,
}

/// `[fetch]` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchSection {
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for SiteSection {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8080/".to_string(),
            name: None,
            shell: "index.html".to_string(),
        }
    }
}

impl Default for PagesSection {
    fn default() -> Self {
        Self {
            dir: "pages".to_string(),
            default: DEFAULT_PAGE.to_string(),
            not_found: NOT_FOUND_PAGE.to_string(),
        }
    }
}

impl Default for FetchSection {
    fn default() -> Self {
        Self { timeout_secs: 30 }
    }
}

impl SiteConfig {
    /// Load configuration from the default location, then apply environment
    /// overrides.
    ///
    /// A missing file is not an error; defaults are used instead.
    pub fn load() -> Result<Self> {
        let mut config = match Self::config_path() {
            Some(path) if path.exists() => Self::from_path(&path)?,
            _ => Self::default(),
        };
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load configuration from an explicit file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read {}: {e}", path.display())))?;
        let config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse {}: {e}", path.display())))?;
        debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Where the configuration file is looked up.
    ///
    /// `$VITRINE_CONFIG` wins; otherwise the platform config directory, e.g.
    /// `~/.config/vitrine/config.toml` on Linux.
    #[must_use]
    pub fn config_path() -> Option<PathBuf> {
        if let Ok(file) = std::env::var(CONFIG_ENV) {
            let trimmed = file.trim();
            if !trimmed.is_empty() {
                return Some(PathBuf::from(trimmed));
            }
        }

        directories::ProjectDirs::from("site", "vitrine", "vitrine")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Apply `VITRINE_BASE_URL` and `VITRINE_DEFAULT_PAGE` when set.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(
            std::env::var(BASE_URL_ENV).ok(),
            std::env::var(DEFAULT_PAGE_ENV).ok(),
        );
    }

    fn apply_overrides(&mut self, base_url: Option<String>, default_page: Option<String>) {
        if let Some(url) = base_url.filter(|u| !u.trim().is_empty()) {
            self.site.base_url = url;
        }
        if let Some(page) = default_page.filter(|p| !p.trim().is_empty()) {
            self.pages.default = page;
        }
    }

    /// Check that the configuration can drive a site.
    pub fn validate(&self) -> Result<()> {
        Url::parse(&self.site.base_url)
            .map_err(|e| Error::Config(format!("Invalid base_url '{}': {e}", self.site.base_url)))?;

        if !PageId::new(self.pages.default.as_str()).is_normalized() {
            return Err(Error::Config(format!(
                "Default page '{}' must be lowercase letters, digits and '-'",
                self.pages.default
            )));
        }

        if self.pages.not_found.trim().is_empty() {
            return Err(Error::Config("Not-found page must not be empty".into()));
        }

        if self.fetch.timeout_secs == 0 {
            return Err(Error::Config("fetch.timeout_secs must be positive".into()));
        }

        Ok(())
    }

    /// The default page identifier.
    #[must_use]
    pub fn default_page(&self) -> PageId {
        PageId::new(self.pages.default.as_str())
    }

    /// The not-found page identifier.
    #[must_use]
    pub fn not_found_page(&self) -> PageId {
        PageId::new(self.pages.not_found.as_str())
    }
}
