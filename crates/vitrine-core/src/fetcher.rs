//! Where page files come from.
//!
//! [`PageSource`] is the seam between the page cache and the network. The
//! production implementation, [`HttpPageSource`], fetches static files from
//! the site's HTTP server; tests swap in in-memory sources.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::{debug, info};
use url::Url;

use crate::config::SiteConfig;
use crate::page_id::PageId;
use crate::{Error, Result};

/// Outcome of fetching one page file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageResponse {
    /// The server returned the page's HTML.
    Found(String),
    /// The server answered 404 for this page.
    NotFound,
}

/// A source of raw page files.
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Fetch the raw HTML of `page`.
    ///
    /// A missing page is reported as [`PageResponse::NotFound`], not as an
    /// error. Errors are reserved for failures of the request itself.
    async fn fetch_page(&self, page: &PageId) -> Result<PageResponse>;
}

/// HTTP client for the site's static page files.
pub struct HttpPageSource {
    client: Client,
    base_url: Url,
    pages_dir: String,
    shell_path: String,
}

impl HttpPageSource {
    /// Create a source rooted at `base_url` with the default layout
    /// (`index.html` shell, pages under `pages/`).
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_layout(base_url, "pages", "index.html", Duration::from_secs(30))
    }

    /// Create a source from the site configuration.
    pub fn from_config(config: &SiteConfig) -> Result<Self> {
        Self::with_layout(
            &config.site.base_url,
            &config.pages.dir,
            &config.site.shell,
            Duration::from_secs(config.fetch.timeout_secs),
        )
    }

    /// Create a source with an explicit layout and request timeout.
    pub fn with_layout(
        base_url: &str,
        pages_dir: &str,
        shell_path: &str,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("vitrine/", env!("CARGO_PKG_VERSION")))
            .gzip(true)
            .brotli(true)
            .build()
            .map_err(Error::Network)?;

        Ok(Self {
            client,
            base_url: directory_url(base_url)?,
            pages_dir: pages_dir.trim_matches('/').to_string(),
            shell_path: shell_path.trim_start_matches('/').to_string(),
        })
    }

    /// The base every relative path is resolved against.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// URL of a page file: `{base}{pages_dir}/{page}.html`.
    pub fn page_url(&self, page: &PageId) -> Result<Url> {
        let relative = if self.pages_dir.is_empty() {
            format!("{page}.html")
        } else {
            format!("{}/{page}.html", self.pages_dir)
        };
        Ok(self.base_url.join(&relative)?)
    }

    /// URL of the shell document.
    pub fn shell_url(&self) -> Result<Url> {
        Ok(self.base_url.join(&self.shell_path)?)
    }

    /// Fetch the shell document that hosts every page.
    ///
    /// Unlike pages there is no fallback: a missing shell is an error.
    pub async fn fetch_shell(&self) -> Result<String> {
        let url = self.shell_url()?;
        let response = self.client.get(url.clone()).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(Error::NotFound(format!("Shell document not found at '{url}'")));
        }

        let content = response.error_for_status()?.text().await?;
        info!("Fetched shell ({} bytes) from {}", content.len(), url);
        Ok(content)
    }
}

#[async_trait]
impl PageSource for HttpPageSource {
    async fn fetch_page(&self, page: &PageId) -> Result<PageResponse> {
        let url = self.page_url(page)?;
        debug!("GET {}", url);

        let response = self.client.get(url.clone()).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            debug!("Page '{}' not found at {}", page, url);
            return Ok(PageResponse::NotFound);
        }

        let content = response.error_for_status()?.text().await?;
        info!("Fetched {} bytes for page '{}'", content.len(), page);
        Ok(PageResponse::Found(content))
    }
}

/// Parse `raw` and make sure it ends with `/` so relative joins stay inside it.
fn directory_url(raw: &str) -> Result<Url> {
    let mut url = Url::parse(raw.trim())?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}
