//! # vitrine-core
//!
//! Core functionality for vitrine - a fragment router for static multi-page sites.
//!
//! A vitrine site is a persistent shell (`index.html`: header, menu, footer)
//! plus one small HTML file per page under `pages/`. The address fragment
//! (`#/about`) selects the page; the router fetches and parses it once,
//! caches it, and swaps its title, description and body into the shell
//! without reloading.
//!
//! ## Architecture
//!
//! - **Identifiers**: [`PageId`] normalization and fragment/link extraction
//! - **Parsing**: [`PageRecord`] built from a page file, over an owned [`dom`] tree
//! - **Shell**: [`Shell`], the in-memory page chrome and its isolated body boundary
//! - **Cache**: [`PageCache`] memoization, not-found fallback and background warm-up
//! - **Control**: [`SiteController`], navigation, events and page activation
//! - **Fetching**: the [`PageSource`] seam and its HTTP implementation
//! - **Error Handling**: categorized error types with recovery hints
//!
//! ## Quick Start
//!
//! ```rust
//! use vitrine_core::{PageId, PageRecord};
//!
//! let page = PageRecord::parse(
//!     "<h1>Bienvenue</h1><meta-description>X</meta-description><template><p>Hi</p></template>",
//!     PageId::default_page(),
//!     None,
//! )?;
//!
//! assert_eq!(page.title(), "Bienvenue");
//! assert_eq!(page.description(), "X");
//! # Ok::<(), vitrine_core::Error>(())
//! ```
//!
//! ## Error Handling
//!
//! All operations return [`Result<T, Error>`]. Missing pages are not errors:
//! they resolve to the reserved `@404` page.
//!
//! ```rust
//! use vitrine_core::{Error, PageId, PageRecord};
//!
//! match PageRecord::parse("<p>no heading</p>", PageId::new("broken"), None) {
//!     Ok(_) => println!("Parsed successfully"),
//!     Err(Error::MalformedPage { page, reason }) => eprintln!("{page}: {reason}"),
//!     Err(e) if e.is_recoverable() => eprintln!("Recoverable error: {e}"),
//!     Err(e) => eprintln!("Fatal error: {e}"),
//! }
//! ```

/// Site configuration and its layered resolution
pub mod config;
/// Owned HTML node tree
pub mod dom;
/// Error types and result aliases
pub mod error;
/// Page sources, including the HTTP client
pub mod fetcher;
/// Address and navigation events
pub mod location;
/// Page parsing and activation
pub mod page;
/// Page memoization and warm-up
pub mod page_cache;
/// Page identifiers
pub mod page_id;
/// The persistent page shell
pub mod shell;
/// Site controller
pub mod site;

// Re-export commonly used types
pub use config::{FetchSection, PagesSection, SiteConfig, SiteSection};
pub use error::{Error, Result};
pub use fetcher::{HttpPageSource, PageResponse, PageSource};
pub use location::{Location, NavigationEvent};
pub use page::{PageHost, PageRecord};
pub use page_cache::{PageCache, WarmUp, WarmUpReport};
pub use page_id::{DEFAULT_PAGE, NOT_FOUND_PAGE, PageId};
pub use shell::{BodySlot, MenuEntry, RenderBoundary, Shell, ShellSnapshot};
pub use site::{Navigation, SiteController};
