//! Page identifiers and the helpers that extract them from fragments and links.
//!
//! A page identifier is the page file's name without its `.html` extension.
//! It is lowercase, limited to `[a-z0-9-]`, and doubles as the cache key and
//! as the segment after `#/` in the address fragment.
//!
//! ```rust
//! use vitrine_core::PageId;
//!
//! let id = PageId::normalize("  Accueil!! ").unwrap();
//! assert_eq!(id.as_str(), "accueil");
//! assert!(PageId::normalize("!!!").is_none());
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of the landing page.
pub const DEFAULT_PAGE: &str = "accueil";

/// Reserved identifier of the not-found page. Never reachable from the menu.
pub const NOT_FOUND_PAGE: &str = "@404";

/// Marker that separates the route from the rest of a link or fragment.
const ROUTE_MARKER: &str = "#/";

/// Opaque page identifier used as a cache key and fragment segment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageId(String);

impl PageId {
    /// Wrap an identifier verbatim.
    ///
    /// Callers are responsible for passing an already-normalized value; use
    /// [`PageId::normalize`] for anything that came from a visitor.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Case-fold `raw` and strip every character outside `[a-z0-9-]`.
    ///
    /// Returns `None` when nothing survives, so callers can substitute the
    /// default page.
    #[must_use]
    pub fn normalize(raw: &str) -> Option<Self> {
        let cleaned: String = raw
            .trim()
            .to_lowercase()
            .chars()
            .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-')
            .collect();

        if cleaned.is_empty() {
            None
        } else {
            Some(Self(cleaned))
        }
    }

    /// The landing page identifier (`accueil`).
    #[must_use]
    pub fn default_page() -> Self {
        Self(DEFAULT_PAGE.to_string())
    }

    /// The reserved not-found identifier (`@404`).
    #[must_use]
    pub fn not_found() -> Self {
        Self(NOT_FOUND_PAGE.to_string())
    }

    /// Whether this is the reserved not-found identifier.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.0 == NOT_FOUND_PAGE
    }

    /// Whether the identifier is already in normalized form.
    #[must_use]
    pub fn is_normalized(&self) -> bool {
        Self::normalize(&self.0).is_some_and(|n| n == *self)
    }

    /// Get the string representation.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for PageId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Extract the page identifier requested by an address fragment.
///
/// Only the first path segment after the leading `#` counts, so `#/about/team`
/// selects `about`. Returns `None` for empty fragments and for fragments that
/// carry no route at all (plain anchors like `#contact`).
#[must_use]
pub fn page_from_fragment(fragment: &str) -> Option<PageId> {
    let lowered = fragment.trim().to_lowercase();
    let segment = lowered.split('/').nth(1)?;
    PageId::normalize(segment)
}

/// Extract the page identifier a menu link points to.
///
/// Links encode their target after `#/`. The target is normalized like an
/// address fragment, so `#/About` points to `about`. Links without a route,
/// or with an empty one (`#/`), return `None`.
#[must_use]
pub fn page_from_link(href: &str) -> Option<PageId> {
    let target = href.split(ROUTE_MARKER).nth(1)?;
    PageId::normalize(target)
}

/// Whether a fragment carries a route (`#/...`) rather than a plain anchor.
#[must_use]
pub fn is_route_fragment(fragment: &str) -> bool {
    fragment.starts_with(ROUTE_MARKER)
}
