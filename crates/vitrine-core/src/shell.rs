//! The persistent page shell: header, menu, body slot and metadata.
//!
//! The shell is parsed once from the site's `index.html` and then mutated in
//! place as pages are activated. It never reloads.
//!
//! ## Shell markup contract
//!
//! ```html
//! <html>
//!   <head>
//!     <title>Boulangerie Martin</title>
//!     <meta name="description" content="">
//!     <link rel="stylesheet" href="css/site.css">
//!   </head>
//!   <body>
//!     <nav><ul class="menu">
//!       <li><a href="#/">Accueil</a></li>
//!       <li><a href="#/about">À propos</a></li>
//!     </ul></nav>
//!     <main>
//!       <header><h1>Chargement…</h1></header>
//!       <div class="corps">Chargement…</div>
//!     </main>
//!   </body>
//! </html>
//! ```
//!
//! The body slot (`main > .corps`) starts with a temporary placeholder. The
//! first page activation clears it and attaches a [`RenderBoundary`], an
//! isolated subtree whose styles and scripts are scoped to the page it holds.

use std::sync::atomic::{AtomicU64, Ordering};

use scraper::{Html, Selector};
use serde::Serialize;
use tracing::debug;

use crate::dom::{self, Element, Node};
use crate::page_id::{PageId, page_from_link};
use crate::{Error, Result};

const TITLE_SELECTOR: &str = "title";
const HEADING_SELECTOR: &str = "main > header h1";
const BODY_SLOT_SELECTOR: &str = "main > .corps";
const DESCRIPTION_SELECTOR: &str = "meta[name=description]";
const MENU_ENTRY_SELECTOR: &str = "nav > .menu > li";
const LINK_SELECTOR: &str = "a";
const MENU_LINK_SELECTOR: &str = "nav > .menu a";
const STYLESHEET_SELECTOR: &str = "link[href^=\"css/\"]";

static NEXT_SCOPE: AtomicU64 = AtomicU64::new(1);

/// One entry of the navigation menu.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MenuEntry {
    /// Visible label of the link.
    pub label: String,
    /// Raw `href` of the entry's link (empty when the entry has no link).
    pub href: String,
    /// Whether the entry is marked active.
    pub active: bool,
}

impl MenuEntry {
    /// The page this entry links to, if its link carries a route.
    #[must_use]
    pub fn route(&self) -> Option<PageId> {
        page_from_link(&self.href)
    }

    /// The page this entry links to, defaulting to `default` for links
    /// without an explicit target (e.g. `#/`).
    #[must_use]
    pub fn target(&self, default: &PageId) -> PageId {
        self.route().unwrap_or_else(|| default.clone())
    }
}

/// An isolated rendering scope holding the active page's content.
///
/// Replaced as a unit on every activation, so page-level `<style>` and
/// `<script>` elements never accumulate across navigations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderBoundary {
    scope: String,
    nodes: Vec<Node>,
}

impl RenderBoundary {
    fn attach() -> Self {
        let n = NEXT_SCOPE.fetch_add(1, Ordering::Relaxed);
        Self {
            scope: format!("vitrine-scope-{n}"),
            nodes: Vec::new(),
        }
    }

    /// Unique scope name of this boundary.
    #[must_use]
    pub fn scope(&self) -> &str {
        &self.scope
    }

    /// Current content.
    #[must_use]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Serialize as a declarative closed shadow root.
    #[must_use]
    pub fn to_html(&self) -> String {
        format!(
            "<template shadowrootmode=\"closed\" data-scope=\"{}\">{}</template>",
            self.scope,
            dom::to_html(&self.nodes)
        )
    }
}

/// Content of the shell's body slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BodySlot {
    /// Temporary content shown before the first page is activated.
    Placeholder(Vec<Node>),
    /// The isolated boundary attached by the first activation.
    Isolated(RenderBoundary),
}

/// In-memory model of the persistent page shell.
#[derive(Debug, Clone)]
pub struct Shell {
    site_name: String,
    document_title: String,
    heading: String,
    description: String,
    body: BodySlot,
    menu: Vec<MenuEntry>,
    links: Vec<String>,
    stylesheet: Option<Element>,
}

impl Shell {
    /// Parse the shell document.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Shell`] when the heading, the body slot or the
    /// description meta element is missing.
    pub fn parse(html: &str) -> Result<Self> {
        let document = Html::parse_document(html);

        let site_name = document
            .select(&selector(TITLE_SELECTOR)?)
            .next()
            .map(|title| title.text().collect::<String>().trim().to_string())
            .unwrap_or_default();

        let heading = document
            .select(&selector(HEADING_SELECTOR)?)
            .next()
            .map(|h1| h1.text().collect::<String>().trim().to_string())
            .ok_or_else(|| Error::Shell(format!("no heading matches '{HEADING_SELECTOR}'")))?;

        let placeholder = document
            .select(&selector(BODY_SLOT_SELECTOR)?)
            .next()
            .map(dom::children_of)
            .ok_or_else(|| Error::Shell(format!("no body slot matches '{BODY_SLOT_SELECTOR}'")))?;

        let description = document
            .select(&selector(DESCRIPTION_SELECTOR)?)
            .next()
            .map(|meta| meta.value().attr("content").unwrap_or_default().to_string())
            .ok_or_else(|| {
                Error::Shell(format!("no description element matches '{DESCRIPTION_SELECTOR}'"))
            })?;

        let link = selector(LINK_SELECTOR)?;
        let menu = document
            .select(&selector(MENU_ENTRY_SELECTOR)?)
            .map(|li| {
                let anchor = li.select(&link).next();
                MenuEntry {
                    label: anchor
                        .map(|a| a.text().collect::<String>().trim().to_string())
                        .unwrap_or_default(),
                    href: anchor
                        .and_then(|a| a.value().attr("href"))
                        .unwrap_or_default()
                        .to_string(),
                    active: li
                        .value()
                        .attr("class")
                        .is_some_and(|c| c.split_whitespace().any(|c| c == "active")),
                }
            })
            .collect::<Vec<_>>();

        let links = document
            .select(&selector(MENU_LINK_SELECTOR)?)
            .filter_map(|a| a.value().attr("href"))
            .map(str::to_string)
            .collect::<Vec<_>>();

        let stylesheet = document
            .select(&selector(STYLESHEET_SELECTOR)?)
            .next()
            .map(Element::shallow_from_parsed);

        debug!(
            site = %site_name,
            menu_entries = menu.len(),
            menu_links = links.len(),
            has_stylesheet = stylesheet.is_some(),
            "parsed shell"
        );

        Ok(Self {
            document_title: site_name.clone(),
            site_name,
            heading,
            description,
            body: BodySlot::Placeholder(placeholder),
            menu,
            links,
            stylesheet,
        })
    }

    /// Site name captured from `<title>` when the shell was parsed.
    #[must_use]
    pub fn site_name(&self) -> &str {
        &self.site_name
    }

    /// Current document title.
    #[must_use]
    pub fn document_title(&self) -> &str {
        &self.document_title
    }

    /// Current heading text.
    #[must_use]
    pub fn heading(&self) -> &str {
        &self.heading
    }

    /// Current meta description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// The body slot.
    #[must_use]
    pub const fn body(&self) -> &BodySlot {
        &self.body
    }

    /// The isolated boundary, once attached.
    #[must_use]
    pub const fn boundary(&self) -> Option<&RenderBoundary> {
        match &self.body {
            BodySlot::Isolated(boundary) => Some(boundary),
            BodySlot::Placeholder(_) => None,
        }
    }

    /// Menu entries in document order.
    #[must_use]
    pub fn menu(&self) -> &[MenuEntry] {
        &self.menu
    }

    /// `href` of every link in the menu, sub-menus included, in document
    /// order.
    #[must_use]
    pub fn menu_links(&self) -> &[String] {
        &self.links
    }

    /// The shared stylesheet link, if the shell has one.
    #[must_use]
    pub const fn stylesheet(&self) -> Option<&Element> {
        self.stylesheet.as_ref()
    }

    /// Replace the document title.
    pub fn set_document_title(&mut self, title: String) {
        self.document_title = title;
    }

    /// Replace the heading text.
    pub fn set_heading(&mut self, heading: &str) {
        heading.clone_into(&mut self.heading);
    }

    /// Replace the meta description.
    pub fn set_description(&mut self, description: &str) {
        description.clone_into(&mut self.description);
    }

    /// Replace the content of the body slot's isolated boundary.
    ///
    /// The first call discards the placeholder and attaches the boundary.
    pub fn replace_body(&mut self, nodes: Vec<Node>) {
        if let BodySlot::Placeholder(_) = self.body {
            let boundary = RenderBoundary::attach();
            debug!(scope = boundary.scope(), "attached render boundary");
            self.body = BodySlot::Isolated(boundary);
        }

        if let BodySlot::Isolated(boundary) = &mut self.body {
            boundary.nodes = nodes;
        }
    }

    /// Mark every entry active for which `is_active` returns true, and clear
    /// all others.
    pub fn mark_menu<F>(&mut self, mut is_active: F)
    where
        F: FnMut(&MenuEntry) -> bool,
    {
        for entry in &mut self.menu {
            entry.active = is_active(entry);
        }
    }

    /// Serialize the body slot's current content.
    #[must_use]
    pub fn body_html(&self) -> String {
        match &self.body {
            BodySlot::Placeholder(nodes) => dom::to_html(nodes),
            BodySlot::Isolated(boundary) => boundary.to_html(),
        }
    }

    /// Point-in-time view of everything a visitor can see.
    #[must_use]
    pub fn snapshot(&self) -> ShellSnapshot {
        ShellSnapshot {
            document_title: self.document_title.clone(),
            heading: self.heading.clone(),
            description: self.description.clone(),
            active_menu: self
                .menu
                .iter()
                .filter(|entry| entry.active)
                .map(|entry| entry.label.clone())
                .collect(),
            isolated: self.boundary().is_some(),
            body_html: self.body_html(),
        }
    }
}

/// Serializable view of the shell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShellSnapshot {
    /// Document title.
    pub document_title: String,
    /// Heading text.
    pub heading: String,
    /// Meta description.
    pub description: String,
    /// Labels of the active menu entries.
    pub active_menu: Vec<String>,
    /// Whether the render boundary is attached.
    pub isolated: bool,
    /// Serialized body slot content.
    pub body_html: String,
}

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| Error::Shell(format!("invalid selector '{css}': {e}")))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use super::*;

    pub(crate) const SHELL: &str = r##"<!doctype html>
<html>
<head>
  <title>Boulangerie Martin</title>
  <meta name="description" content="Pains et viennoiseries">
  <link rel="stylesheet" href="css/site.css">
  <link rel="icon" href="favicon.ico">
</head>
<body>
  <nav><ul class="menu">
    <li class="active"><a href="#/">Accueil</a></li>
    <li><a href="#/about">À propos</a></li>
    <li><a href="#/contact">Contact</a></li>
  </ul></nav>
  <main>
    <header><h1>Chargement…</h1></header>
    <div class="corps"><p>Chargement…</p></div>
  </main>
</body>
</html>"##;

    #[test]
    fn test_parse_reads_the_shell_contract() {
        let shell = Shell::parse(SHELL).unwrap();
        assert_eq!(shell.site_name(), "Boulangerie Martin");
        assert_eq!(shell.document_title(), "Boulangerie Martin");
        assert_eq!(shell.heading(), "Chargement…");
        assert_eq!(shell.description(), "Pains et viennoiseries");
        assert_eq!(shell.body_html(), "<p>Chargement…</p>");
        assert!(shell.boundary().is_none());

        let labels: Vec<&str> = shell.menu().iter().map(|e| e.label.as_str()).collect();
        assert_eq!(labels, vec!["Accueil", "À propos", "Contact"]);
        assert!(shell.menu()[0].active);

        let stylesheet = shell.stylesheet().unwrap();
        assert_eq!(stylesheet.get_attribute("href"), Some("css/site.css"));
    }

    #[test]
    fn test_missing_description_is_rejected() {
        let meta = r#"<meta name="description" content="Pains et viennoiseries">"#;
        let html = SHELL.replace(meta, "");
        let err = Shell::parse(&html).unwrap_err();
        assert_eq!(err.category(), "shell");
    }

    #[test]
    fn test_missing_body_slot_is_rejected() {
        let html = SHELL.replace("class=\"corps\"", "class=\"other\"");
        assert!(Shell::parse(&html).is_err());
    }

    #[test]
    fn test_menu_targets_default_for_bare_links() {
        let shell = Shell::parse(SHELL).unwrap();
        let default = PageId::default_page();
        let targets: Vec<String> = shell
            .menu()
            .iter()
            .map(|e| e.target(&default).to_string())
            .collect();
        assert_eq!(targets, vec!["accueil", "about", "contact"]);
        assert!(shell.menu()[0].route().is_none());
    }

    #[test]
    fn test_menu_links_include_sub_menus() {
        let nested = r##"<li><a href="#/contact">Contact</a></li>
    <li><a href="#/services">Services</a>
      <ul><li><a href="#/web">Web</a></li><li><a href="#/print">Print</a></li></ul>
    </li>"##;
        let html = SHELL.replace(r##"<li><a href="#/contact">Contact</a></li>"##, nested);
        let shell = Shell::parse(&html).unwrap();

        assert_eq!(
            shell.menu_links(),
            &["#/", "#/about", "#/contact", "#/services", "#/web", "#/print"]
        );
        // Sub-menu items are not entries of their own
        let labels: Vec<&str> = shell.menu().iter().map(|e| e.label.as_str()).collect();
        assert_eq!(labels, vec!["Accueil", "À propos", "Contact", "Services"]);
    }

    #[test]
    fn test_first_body_replacement_attaches_boundary_once() {
        let mut shell = Shell::parse(SHELL).unwrap();

        shell.replace_body(vec![Node::text("one")]);
        let scope = shell.boundary().unwrap().scope().to_string();
        assert!(!shell.body_html().contains("Chargement"));

        shell.replace_body(vec![Node::text("two")]);
        let boundary = shell.boundary().unwrap();
        assert_eq!(boundary.scope(), scope);
        assert_eq!(boundary.nodes(), &[Node::text("two")]);
        assert!(shell.body_html().starts_with("<template shadowrootmode=\"closed\""));
    }

    #[test]
    fn test_snapshot_lists_active_entries() {
        let mut shell = Shell::parse(SHELL).unwrap();
        shell.mark_menu(|entry| entry.href.ends_with("about"));
        let snapshot = shell.snapshot();
        assert_eq!(snapshot.active_menu, vec!["À propos"]);
        assert!(!snapshot.isolated);
    }
}
