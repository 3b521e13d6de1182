//! In-memory page cache and fetch coordination.
//!
//! The cache memoizes parsed pages for the lifetime of the site. It is
//! append-only: entries are never evicted or expired, and an entry is only
//! replaced when the same page is fetched again.
//!
//! ## Not-found fallback
//!
//! When the server answers 404, [`PageCache::resolve`] substitutes the
//! reserved not-found page. That page is cached under its own identifier, so
//! it is fetched at most once however many distinct missing pages are
//! requested. The missing identifier itself is not cached.
//!
//! ## Concurrency
//!
//! There is no in-flight de-duplication. Two concurrent `resolve` calls for
//! the same uncached page may both fetch it; the later completion overwrites
//! the entry with an equivalent record.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use futures::future::join_all;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::dom::Element;
use crate::fetcher::{PageResponse, PageSource};
use crate::page::PageRecord;
use crate::page_id::PageId;
use crate::{Error, Result};

/// Shared, cloneable handle to the page cache.
///
/// Clones share the same entries, which is what lets warm-up tasks fill the
/// cache the controller reads from.
#[derive(Clone)]
pub struct PageCache {
    inner: Arc<CacheInner>,
}

struct CacheInner {
    source: Arc<dyn PageSource>,
    pages: RwLock<HashMap<PageId, Arc<PageRecord>>>,
    shared_stylesheet: Option<Element>,
    not_found: PageId,
    fetches: AtomicUsize,
}

impl PageCache {
    /// Create an empty cache backed by `source`.
    pub fn new(
        source: Arc<dyn PageSource>,
        shared_stylesheet: Option<Element>,
        not_found: PageId,
    ) -> Self {
        Self {
            inner: Arc::new(CacheInner {
                source,
                pages: RwLock::new(HashMap::new()),
                shared_stylesheet,
                not_found,
                fetches: AtomicUsize::new(0),
            }),
        }
    }

    /// Look up a cached page without fetching.
    pub async fn get(&self, page: &PageId) -> Option<Arc<PageRecord>> {
        self.inner.pages.read().await.get(page).cloned()
    }

    /// Whether `page` is cached.
    pub async fn contains(&self, page: &PageId) -> bool {
        self.inner.pages.read().await.contains_key(page)
    }

    /// Number of cached pages.
    pub async fn len(&self) -> usize {
        self.inner.pages.read().await.len()
    }

    /// Whether the cache is empty.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Identifiers of all cached pages, sorted.
    pub async fn cached_pages(&self) -> Vec<PageId> {
        let mut pages: Vec<PageId> = self.inner.pages.read().await.keys().cloned().collect();
        pages.sort();
        pages
    }

    /// Number of page fetches issued so far, including not-found answers.
    pub fn fetch_count(&self) -> usize {
        self.inner.fetches.load(Ordering::Relaxed)
    }

    /// Return the record for `page`, fetching and parsing it on a miss.
    ///
    /// # Errors
    ///
    /// - [`Error::Network`] when a request fails
    /// - [`Error::MalformedPage`] when a fetched page has no heading
    /// - [`Error::NotFound`] when the not-found page itself is missing
    pub async fn resolve(&self, page: &PageId) -> Result<Arc<PageRecord>> {
        if let Some(hit) = self.get(page).await {
            debug!("Cache hit for '{}'", page);
            return Ok(hit);
        }

        if let Some(record) = self.load(page).await? {
            return Ok(record);
        }

        let not_found = &self.inner.not_found;
        if page == not_found {
            return Err(Error::NotFound(format!(
                "The not-found page '{not_found}' is itself missing"
            )));
        }

        warn!("Page '{}' not found, showing '{}'", page, not_found);
        if let Some(hit) = self.get(not_found).await {
            return Ok(hit);
        }

        self.load(not_found).await?.ok_or_else(|| {
            Error::NotFound(format!("The not-found page '{not_found}' is itself missing"))
        })
    }

    /// Fetch, parse and store one page. `None` means the server answered 404.
    async fn load(&self, page: &PageId) -> Result<Option<Arc<PageRecord>>> {
        self.inner.fetches.fetch_add(1, Ordering::Relaxed);

        let html = match self.inner.source.fetch_page(page).await? {
            PageResponse::Found(html) => html,
            PageResponse::NotFound => return Ok(None),
        };

        let record = Arc::new(PageRecord::parse(
            &html,
            page.clone(),
            self.inner.shared_stylesheet.as_ref(),
        )?);

        // Avoid holding the write guard longer than the insert itself
        {
            let mut pages = self.inner.pages.write().await;
            pages.insert(page.clone(), Arc::clone(&record));
        }

        info!("Cached page '{}' ({})", page, record.title());
        Ok(Some(record))
    }

    /// Resolve every page in `pages` in the background, one task per page.
    ///
    /// Tasks are independent: one failure never affects the others, and
    /// failures are logged rather than propagated.
    pub fn warm<I>(&self, pages: I) -> WarmUp
    where
        I: IntoIterator<Item = PageId>,
    {
        let tasks = pages
            .into_iter()
            .map(|page| {
                let cache = self.clone();
                let target = page.clone();
                let handle = tokio::spawn(async move {
                    cache.resolve(&target).await.map(|_| ()).map_err(|e| {
                        warn!(
                            page = %target,
                            category = e.category(),
                            "Warm-up fetch failed: {e}"
                        );
                        e.to_string()
                    })
                });
                (page, handle)
            })
            .collect();

        WarmUp { tasks }
    }
}

/// Handle on a background warm-up.
///
/// Dropping the handle detaches the tasks; they keep filling the cache.
#[derive(Debug)]
pub struct WarmUp {
    tasks: Vec<(PageId, JoinHandle<std::result::Result<(), String>>)>,
}

impl WarmUp {
    /// Pages being warmed, in spawn order.
    pub fn pages(&self) -> impl Iterator<Item = &PageId> {
        self.tasks.iter().map(|(page, _)| page)
    }

    /// Number of warm-up tasks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Whether nothing needed warming.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Wait for every task and summarize the outcome.
    pub async fn wait(self) -> WarmUpReport {
        let (pages, handles): (Vec<_>, Vec<_>) = self.tasks.into_iter().unzip();
        let outcomes = join_all(handles).await;

        let mut report = WarmUpReport::default();
        for (page, outcome) in pages.into_iter().zip(outcomes) {
            match outcome {
                Ok(Ok(())) => report.warmed.push(page),
                Ok(Err(reason)) => report.failed.push((page, reason)),
                Err(join_err) => report.failed.push((page, join_err.to_string())),
            }
        }
        report
    }
}

/// Outcome of a finished warm-up.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WarmUpReport {
    /// Pages that resolved (possibly to the not-found page).
    pub warmed: Vec<PageId>,
    /// Pages whose resolution failed, with the reason.
    pub failed: Vec<(PageId, String)>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
pub(crate) mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// In-memory source that records every request.
    #[derive(Default)]
    pub(crate) struct StaticSource {
        pages: HashMap<String, String>,
        failing: Vec<String>,
        pub(crate) requests: Mutex<Vec<String>>,
    }

    impl StaticSource {
        pub(crate) fn with_page(mut self, id: &str, html: &str) -> Self {
            self.pages.insert(id.to_string(), html.to_string());
            self
        }

        pub(crate) fn with_failure(mut self, id: &str) -> Self {
            self.failing.push(id.to_string());
            self
        }

        pub(crate) fn requests_for(&self, id: &str) -> usize {
            self.requests.lock().unwrap().iter().filter(|r| *r == id).count()
        }
    }

    #[async_trait]
    impl PageSource for StaticSource {
        async fn fetch_page(&self, page: &PageId) -> Result<PageResponse> {
            self.requests.lock().unwrap().push(page.to_string());
            if self.failing.iter().any(|f| f == page.as_str()) {
                return Err(Error::Other(format!("connection reset fetching {page}")));
            }
            Ok(self
                .pages
                .get(page.as_str())
                .map_or(PageResponse::NotFound, |html| PageResponse::Found(html.clone())))
        }
    }

    fn cache_over(source: &Arc<StaticSource>) -> PageCache {
        PageCache::new(
            Arc::clone(source) as Arc<dyn PageSource>,
            None,
            PageId::not_found(),
        )
    }

    fn site() -> StaticSource {
        StaticSource::default()
            .with_page("accueil", "<h1>Bienvenue</h1><template><p>Hi</p></template>")
            .with_page("about", "<h1>About</h1>")
            .with_page("@404", "<h1>Page introuvable</h1>")
    }

    #[tokio::test]
    async fn test_second_resolve_is_a_cache_hit() {
        let source = Arc::new(site());
        let cache = cache_over(&source);

        let first = cache.resolve(&PageId::new("accueil")).await.unwrap();
        let second = cache.resolve(&PageId::new("accueil")).await.unwrap();

        assert_eq!(first.title(), second.title());
        assert_eq!(first.description(), second.description());
        assert_eq!(first.id(), second.id());
        assert_eq!(source.requests_for("accueil"), 1);
        assert_eq!(cache.fetch_count(), 1);
    }

    #[tokio::test]
    async fn test_missing_pages_share_one_not_found_fetch() {
        let source = Arc::new(site());
        let cache = cache_over(&source);

        for missing in ["nope", "gone", "never"] {
            let record = cache.resolve(&PageId::new(missing)).await.unwrap();
            assert_eq!(record.id().as_str(), "@404");
        }

        assert_eq!(source.requests_for("@404"), 1);
        assert!(!cache.contains(&PageId::new("nope")).await);
        assert_eq!(cache.cached_pages().await, vec![PageId::not_found()]);
    }

    #[tokio::test]
    async fn test_missing_not_found_page_is_an_error() {
        let source = Arc::new(StaticSource::default());
        let cache = cache_over(&source);

        let err = cache.resolve(&PageId::new("nope")).await.unwrap_err();
        assert_eq!(err.category(), "not_found");

        let err = cache.resolve(&PageId::not_found()).await.unwrap_err();
        assert_eq!(err.category(), "not_found");
        assert_eq!(source.requests_for("@404"), 2);
    }

    #[tokio::test]
    async fn test_fetch_failure_propagates_and_caches_nothing() {
        let source = Arc::new(site().with_failure("about"));
        let cache = cache_over(&source);

        assert!(cache.resolve(&PageId::new("about")).await.is_err());
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_malformed_page_propagates() {
        let source = Arc::new(StaticSource::default().with_page("bad", "<p>no title</p>"));
        let cache = cache_over(&source);

        match cache.resolve(&PageId::new("bad")).await {
            Err(Error::MalformedPage { page, .. }) => assert_eq!(page, "bad"),
            other => panic!("expected malformed page, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_warm_isolates_failures() {
        let source = Arc::new(site().with_failure("contact"));
        let cache = cache_over(&source);

        let warm = cache.warm([PageId::new("about"), PageId::new("contact")]);
        assert_eq!(warm.len(), 2);

        let report = warm.wait().await;
        assert_eq!(report.warmed, vec![PageId::new("about")]);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, PageId::new("contact"));
        assert!(cache.contains(&PageId::new("about")).await);
    }

    #[tokio::test]
    async fn test_dropped_warm_up_keeps_running() {
        let source = Arc::new(site());
        let cache = cache_over(&source);

        drop(cache.warm([PageId::new("about")]));

        for _ in 0..100 {
            if cache.contains(&PageId::new("about")).await {
                return;
            }
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        }
        panic!("detached warm-up never cached the page");
    }
}
