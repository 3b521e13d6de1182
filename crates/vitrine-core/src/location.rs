//! The visitor's current address and the events that change it.

use crate::page_id::PageId;

/// Current address of the site, as the visitor sees it in the address bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    href: String,
}

impl Location {
    /// Create a location from a full address.
    pub fn new(href: impl Into<String>) -> Self {
        Self { href: href.into() }
    }

    /// The full address.
    #[must_use]
    pub fn href(&self) -> &str {
        &self.href
    }

    /// The fragment including its leading `#`.
    ///
    /// Mirrors browser semantics: an address without a fragment, or with an
    /// empty one (`page.html#`), yields the empty string.
    #[must_use]
    pub fn hash(&self) -> &str {
        match self.href.find('#') {
            Some(idx) if idx + 1 < self.href.len() => &self.href[idx..],
            _ => "",
        }
    }

    /// Whether the address contains a `#` at all, even an empty fragment.
    #[must_use]
    pub fn has_fragment_marker(&self) -> bool {
        self.href.contains('#')
    }

    /// Replace the whole address.
    pub fn set_href(&mut self, href: impl Into<String>) {
        self.href = href.into();
    }

    /// Replace the fragment, keeping everything before it.
    ///
    /// `fragment` may be given with or without its leading `#`.
    pub fn set_hash(&mut self, fragment: &str) {
        let base_len = self.href.find('#').unwrap_or(self.href.len());
        self.href.truncate(base_len);
        if !fragment.is_empty() {
            if !fragment.starts_with('#') {
                self.href.push('#');
            }
            self.href.push_str(fragment);
        }
    }

    /// Point the fragment at a page (`#/{id}`).
    pub fn set_page(&mut self, page: &PageId) {
        self.set_hash(&format!("#/{page}"));
    }
}

/// Something that happened in the host environment and may change the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationEvent {
    /// The address changed, typically after a menu click or the back button.
    HashChange {
        /// The new full address.
        href: String,
    },
    /// Navigate to a page programmatically by rewriting the fragment.
    Go(PageId),
}
