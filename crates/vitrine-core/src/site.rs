//! The site controller: what page is shown, and how it gets there.
//!
//! [`SiteController`] owns the [`Shell`], the visitor's [`Location`] and the
//! [`PageCache`]. Every navigation reads the address fragment, resolves the
//! page through the cache and activates the resulting record against the
//! shell.
//!
//! ```rust,no_run
//! use vitrine_core::{Location, SiteConfig, SiteController};
//!
//! # async fn run() -> vitrine_core::Result<()> {
//! let config = SiteConfig::load()?;
//! let location = Location::new(format!("{}#/about", config.site.base_url));
//! let mut site = SiteController::connect(&config, location).await?;
//!
//! let warm_up = site.initialize().await?;
//! println!("{}", site.shell().document_title());
//! warm_up.wait().await;
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::config::SiteConfig;
use crate::dom::Node;
use crate::fetcher::{HttpPageSource, PageSource};
use crate::location::{Location, NavigationEvent};
use crate::page::PageHost;
use crate::page_cache::{PageCache, WarmUp};
use crate::page_id::{PageId, is_route_fragment, page_from_fragment, page_from_link};
use crate::shell::Shell;
use crate::Result;

/// Outcome of one navigation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "outcome", content = "page")]
pub enum Navigation {
    /// A page record was activated. Carries the identifier of the record
    /// actually shown, which is the not-found page for missing pages.
    Activated(PageId),
    /// The fragment was a plain in-page anchor; nothing was swapped.
    AnchorJump,
}

/// Single source of truth for the page being shown.
pub struct SiteController {
    shell: Shell,
    location: Location,
    cache: PageCache,
    default_page: PageId,
    site_name: String,
}

impl SiteController {
    /// Build a controller over an already parsed shell.
    ///
    /// The site name comes from `config.site.name`, falling back to the
    /// shell's `<title>`.
    pub fn new(
        shell: Shell,
        source: Arc<dyn PageSource>,
        config: &SiteConfig,
        location: Location,
    ) -> Self {
        let site_name = config
            .site
            .name
            .clone()
            .unwrap_or_else(|| shell.site_name().to_string());
        let cache = PageCache::new(source, shell.stylesheet().cloned(), config.not_found_page());

        Self {
            shell,
            location,
            cache,
            default_page: config.default_page(),
            site_name,
        }
    }

    /// Fetch the shell over HTTP and build a controller backed by
    /// [`HttpPageSource`].
    ///
    /// # Errors
    ///
    /// Fails when the configuration is invalid, the shell cannot be fetched,
    /// or the shell does not follow the markup contract.
    pub async fn connect(config: &SiteConfig, location: Location) -> Result<Self> {
        config.validate()?;
        let source = HttpPageSource::from_config(config)?;
        let shell = Shell::parse(&source.fetch_shell().await?)?;
        Ok(Self::new(shell, Arc::new(source), config, location))
    }

    /// Show the initial page, then start warming every menu page.
    ///
    /// The initial navigation has completed, and the shell reflects it, when
    /// this returns. Event handling is started separately with
    /// [`SiteController::listen`].
    ///
    /// # Errors
    ///
    /// Propagates a failure of the initial navigation; no warm-up is started
    /// in that case.
    pub async fn initialize(&mut self) -> Result<WarmUp> {
        self.navigate(None).await?;
        Ok(self.warm_all())
    }

    /// The page named by the address fragment, or the default page.
    #[must_use]
    pub fn current_page_id(&self) -> PageId {
        page_from_fragment(self.location.hash()).unwrap_or_else(|| self.default_page.clone())
    }

    /// Navigate to `requested`, or to the page named by the current address.
    ///
    /// Without an explicit page, an address holding a plain anchor
    /// (`index.html#team`) is an in-page jump and leaves the shell untouched.
    ///
    /// # Errors
    ///
    /// Propagates network failures and malformed pages. Missing pages are not
    /// errors; they resolve to the not-found page.
    pub async fn navigate(&mut self, requested: Option<&PageId>) -> Result<Navigation> {
        let page = match requested {
            Some(page) => page.clone(),
            None => {
                if self.is_anchor_jump() {
                    debug!("Anchor jump to '{}', keeping current page", self.location.hash());
                    return Ok(Navigation::AnchorJump);
                }
                self.current_page_id()
            },
        };

        let record = self.cache.resolve(&page).await?;
        record.activate(self);
        info!("Activated '{}' for '{}'", record.id(), page);
        Ok(Navigation::Activated(record.id().clone()))
    }

    fn is_anchor_jump(&self) -> bool {
        !is_route_fragment(self.location.hash()) && self.location.has_fragment_marker()
    }

    /// Apply one host event: update the address, then navigate.
    ///
    /// # Errors
    ///
    /// Same as [`SiteController::navigate`].
    pub async fn handle_event(&mut self, event: NavigationEvent) -> Result<Navigation> {
        match event {
            NavigationEvent::HashChange { href } => self.location.set_href(href),
            NavigationEvent::Go(page) => self.location.set_page(&page),
        }
        self.navigate(None).await
    }

    /// Navigate programmatically by rewriting the fragment to `#/{page}`.
    ///
    /// # Errors
    ///
    /// Same as [`SiteController::navigate`].
    pub async fn go_to(&mut self, page: &PageId) -> Result<Navigation> {
        self.handle_event(NavigationEvent::Go(page.clone())).await
    }

    /// Handle navigation events until the channel closes.
    ///
    /// Events are handled one at a time in arrival order. A failed navigation
    /// is logged and the loop keeps going. `on_navigated` sees the shell after
    /// each successful navigation.
    pub async fn listen<F>(
        &mut self,
        mut events: mpsc::Receiver<NavigationEvent>,
        mut on_navigated: F,
    ) where
        F: FnMut(&Navigation, &Shell),
    {
        while let Some(event) = events.recv().await {
            match self.handle_event(event).await {
                Ok(navigation) => on_navigated(&navigation, &self.shell),
                Err(e) => error!(
                    category = e.category(),
                    href = self.location.href(),
                    "Navigation failed: {e}"
                ),
            }
        }
        debug!("Navigation event channel closed");
    }

    /// Start resolving every page the menu links to, except the current one.
    ///
    /// Links without an explicit target (`#/`) are skipped. Each page is
    /// resolved in its own task; see [`WarmUp`].
    #[must_use]
    pub fn warm_all(&self) -> WarmUp {
        let current = self.current_page_id();
        let mut targets: Vec<PageId> = Vec::new();

        for page in self.shell.menu_links().iter().filter_map(|href| page_from_link(href)) {
            if page != current && !targets.contains(&page) {
                targets.push(page);
            }
        }

        debug!("Warming {} page(s) besides '{}'", targets.len(), current);
        self.cache.warm(targets)
    }

    /// The shell in its current state.
    #[must_use]
    pub const fn shell(&self) -> &Shell {
        &self.shell
    }

    /// The page cache.
    #[must_use]
    pub const fn cache(&self) -> &PageCache {
        &self.cache
    }

    /// The visitor's current address.
    #[must_use]
    pub const fn location(&self) -> &Location {
        &self.location
    }

    /// Site name used in document titles.
    #[must_use]
    pub fn site_name(&self) -> &str {
        &self.site_name
    }
}

impl PageHost for SiteController {
    fn apply_title(&mut self, title: &str) {
        self.shell
            .set_document_title(format!("{title} \u{2013} {}", self.site_name));
        self.shell.set_heading(title);
    }

    fn apply_description(&mut self, description: &str) {
        self.shell.set_description(description);
    }

    fn apply_body(&mut self, nodes: Vec<Node>) {
        self.shell.replace_body(nodes);
    }

    fn set_active_menu_entry(&mut self, page: &PageId) {
        let default = &self.default_page;
        self.shell.mark_menu(|entry| entry.target(default) == *page);
    }
}
