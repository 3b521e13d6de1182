//! Parsed pages and their activation against the shell.
//!
//! A page file is a small HTML document following the page authoring
//! contract:
//!
//! ```html
//! <h1>Bienvenue</h1>
//! <meta-description>Une courte description</meta-description>
//! <style>p { color: teal }</style>
//! <template><p>Contenu de la page</p></template>
//! <script>console.log("ready")</script>
//! ```
//!
//! [`PageRecord::parse`] turns that text into an immutable [`PageRecord`].
//! [`PageRecord::activate`] later pushes the record into anything that
//! implements [`PageHost`], normally the site controller.

use scraper::{ElementRef, Html};
use serde::Serialize;
use tracing::debug;

use crate::dom::{self, Element, Node};
use crate::page_id::PageId;
use crate::{Error, Result};

/// Receiver of a page's content when it becomes the visible page.
///
/// The site controller implements this; tests can implement it to observe
/// activation order.
pub trait PageHost {
    /// Show `title` in the document title and in the shell heading.
    fn apply_title(&mut self, title: &str);
    /// Set the SEO meta description.
    fn apply_description(&mut self, description: &str);
    /// Replace the content of the isolated rendering boundary.
    fn apply_body(&mut self, nodes: Vec<Node>);
    /// Mark the menu entries that point at `page` as active.
    fn set_active_menu_entry(&mut self, page: &PageId);
}

/// One successfully parsed page.
///
/// Fields are never mutated after construction. A re-fetch builds a new
/// record that replaces the cached one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageRecord {
    id: PageId,
    title: String,
    description: String,
    body: Vec<Node>,
}

impl PageRecord {
    /// Parse raw page HTML into a record.
    ///
    /// `shared_stylesheet` is the shell's primary stylesheet `<link>`; a copy
    /// of it is injected into every page body so the isolated boundary still
    /// receives the site styling. The browser already has that stylesheet
    /// loaded, so the copy costs no extra request.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedPage`] when the page has no `h1`.
    pub fn parse(raw_html: &str, id: PageId, shared_stylesheet: Option<&Element>) -> Result<Self> {
        let document = Html::parse_document(raw_html);
        let live = LiveElements::collect(&document);

        let title = live
            .first_named("h1")
            .map(|h1| h1.text().collect::<String>().trim().to_string())
            .ok_or_else(|| Error::MalformedPage {
                page: id.to_string(),
                reason: "missing <h1> heading".to_string(),
            })?;

        let description = live
            .first_named("meta-description")
            .map(|el| el.text().collect::<String>().trim().to_string())
            .unwrap_or_default();

        let content = live
            .first_named("template")
            .map(dom::children_of)
            .unwrap_or_default();

        let styles = live
            .all_named("style")
            .map(|el| Node::Element(Element::from_parsed(el)));
        let scripts = live
            .all_named("script")
            .map(|el| Node::Element(Element::from_parsed(el)));

        let mut body: Vec<Node> = styles.collect();
        if let Some(link) = shared_stylesheet {
            body.push(Node::Element(link.clone()));
        }
        body.extend(content);
        body.extend(scripts);

        debug!(
            page = %id,
            nodes = body.len(),
            "parsed page"
        );

        Ok(Self {
            id,
            title,
            description,
            body,
        })
    }

    /// Key under which the record is cached.
    #[must_use]
    pub const fn id(&self) -> &PageId {
        &self.id
    }

    /// Page heading text, also used for the document title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// SEO description, empty when the page has none.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// The detached body content owned by this record.
    #[must_use]
    pub fn body(&self) -> &[Node] {
        &self.body
    }

    /// Push this record into `host`.
    ///
    /// Order is fixed: title, description, a deep copy of the body, then the
    /// active menu entry. The cached body is never handed out, so activating
    /// the same record again yields the same visible state.
    pub fn activate<H: PageHost + ?Sized>(&self, host: &mut H) {
        host.apply_title(&self.title);
        host.apply_description(&self.description);
        host.apply_body(self.body.clone());
        host.set_active_menu_entry(&self.id);
    }
}

/// Elements of a parsed document that are live, i.e. outside any `<template>`.
///
/// Template content is inert, so a `<style>` inside the template belongs to
/// the page body and must not be hoisted a second time.
struct LiveElements<'a> {
    elements: Vec<ElementRef<'a>>,
}

impl<'a> LiveElements<'a> {
    fn collect(document: &'a Html) -> Self {
        let elements = document
            .root_element()
            .descendants()
            .filter_map(ElementRef::wrap)
            .filter(|el| !inside_template(*el))
            .collect();
        Self { elements }
    }

    fn all_named(&self, name: &'static str) -> impl Iterator<Item = ElementRef<'a>> + '_ {
        self.elements
            .iter()
            .copied()
            .filter(move |el| el.value().name() == name)
    }

    fn first_named(&self, name: &'static str) -> Option<ElementRef<'a>> {
        self.all_named(name).next()
    }
}

fn inside_template(element: ElementRef<'_>) -> bool {
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .any(|ancestor| ancestor.value().name() == "template")
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::dom::to_html;

    const WELCOME: &str = "<h1>Bienvenue</h1><meta-description>X</meta-description>\
                           <template><p>Hi</p></template>";

    fn stylesheet() -> Element {
        Element::new("link")
            .with_attribute("rel", "stylesheet")
            .with_attribute("href", "css/site.css")
    }

    #[derive(Default)]
    struct RecordingHost {
        calls: Vec<String>,
        body: Vec<Node>,
    }

    impl PageHost for RecordingHost {
        fn apply_title(&mut self, title: &str) {
            self.calls.push(format!("title:{title}"));
        }

        fn apply_description(&mut self, description: &str) {
            self.calls.push(format!("description:{description}"));
        }

        fn apply_body(&mut self, nodes: Vec<Node>) {
            self.calls.push(format!("body:{}", nodes.len()));
            self.body = nodes;
        }

        fn set_active_menu_entry(&mut self, page: &PageId) {
            self.calls.push(format!("menu:{page}"));
        }
    }

    #[test]
    fn test_parse_extracts_title_description_and_body() {
        let page = PageRecord::parse(WELCOME, PageId::new("accueil"), None).unwrap();
        assert_eq!(page.id().as_str(), "accueil");
        assert_eq!(page.title(), "Bienvenue");
        assert_eq!(page.description(), "X");
        assert_eq!(to_html(page.body()), "<p>Hi</p>");
    }

    #[test]
    fn test_template_content_becomes_the_body_wherever_it_sits() {
        let layouts = [
            "<h1>T</h1><template><p>content</p></template>",
            "<template><p>content</p></template><h1>T</h1>",
            "<!doctype html><html><head></head><body><h1>T</h1>\
             <template><p>content</p></template></body></html>",
            "<html><head><template><p>content</p></template></head>\
             <body><h1>T</h1></body></html>",
        ];

        for raw in layouts {
            let page = PageRecord::parse(raw, PageId::new("layout"), None).unwrap();
            assert_eq!(to_html(page.body()), "<p>content</p>", "layout: {raw}");
        }
    }

    #[test]
    fn test_title_and_description_are_trimmed() {
        let raw = "<h1>\n   Contact  \n</h1><meta-description>  Écrivez-nous </meta-description>";
        let page = PageRecord::parse(raw, PageId::new("contact"), None).unwrap();
        assert_eq!(page.title(), "Contact");
        assert_eq!(page.description(), "Écrivez-nous");
        assert!(page.body().is_empty());
    }

    #[test]
    fn test_missing_description_is_empty() {
        let raw = "<h1>About</h1><template>x</template>";
        let page = PageRecord::parse(raw, PageId::new("about"), None).unwrap();
        assert_eq!(page.description(), "");
    }

    #[test]
    fn test_missing_heading_is_a_malformed_page() {
        let err = PageRecord::parse("<p>no heading</p>", PageId::new("broken"), None).unwrap_err();
        match err {
            Error::MalformedPage { page, .. } => assert_eq!(page, "broken"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_heading_inside_template_does_not_count() {
        let raw = "<template><h1>Inert</h1></template>";
        assert!(PageRecord::parse(raw, PageId::new("inert"), None).is_err());
    }

    #[test]
    fn test_body_order_styles_stylesheet_content_scripts() {
        let raw = "<style>h2 { color: red }</style><h1>Produits</h1>\
                   <template><h2>Liste</h2><style>.inner {}</style></template>\
                   <script>init()</script>";
        let page = PageRecord::parse(raw, PageId::new("produits"), Some(&stylesheet())).unwrap();

        assert_eq!(
            to_html(page.body()),
            "<style>h2 { color: red }</style>\
             <link rel=\"stylesheet\" href=\"css/site.css\">\
             <h2>Liste</h2><style>.inner {}</style>\
             <script>init()</script>"
        );
    }

    #[test]
    fn test_stylesheet_is_injected_into_every_page() {
        let link = stylesheet();
        let a = PageRecord::parse(WELCOME, PageId::new("accueil"), Some(&link)).unwrap();
        let b = PageRecord::parse("<h1>B</h1>", PageId::new("b"), Some(&link)).unwrap();
        assert_eq!(a.body()[0], Node::Element(link.clone()));
        assert_eq!(b.body(), &[Node::Element(link)]);
    }

    #[test]
    fn test_activate_calls_host_in_order() {
        let page = PageRecord::parse(WELCOME, PageId::new("accueil"), None).unwrap();
        let mut host = RecordingHost::default();
        page.activate(&mut host);

        assert_eq!(
            host.calls,
            vec!["title:Bienvenue", "description:X", "body:1", "menu:accueil"]
        );
    }

    #[test]
    fn test_activate_hands_out_copies() {
        let page = PageRecord::parse(WELCOME, PageId::new("accueil"), None).unwrap();
        let mut host = RecordingHost::default();

        page.activate(&mut host);
        host.body.clear();
        page.activate(&mut host);

        assert_eq!(to_html(&host.body), "<p>Hi</p>");
        assert_eq!(to_html(page.body()), "<p>Hi</p>");
    }
}
