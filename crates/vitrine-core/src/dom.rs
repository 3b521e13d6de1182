//! Detached, owned markup trees.
//!
//! Parsed pages keep their content as plain owned nodes rather than as
//! references into a parser's arena. A page body can then be deep-cloned on
//! every activation and moved into the shell without touching the cached
//! original.
//!
//! ```rust
//! use vitrine_core::dom::{Element, Node, to_html};
//!
//! let paragraph = Element::new("p").with_child(Node::text("Hi & bye"));
//! assert_eq!(to_html(&[Node::Element(paragraph)]), "<p>Hi &amp; bye</p>");
//! ```

use scraper::ElementRef;
use serde::Serialize;

/// Elements that never have children or a closing tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// Elements whose text content is emitted without escaping.
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

/// A node in a detached markup tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Node {
    /// An element with attributes and children.
    Element(Element),
    /// Character data.
    Text {
        /// The text itself, unescaped.
        text: String,
    },
    /// A comment.
    Comment {
        /// The comment body.
        comment: String,
    },
}

impl Node {
    /// Create a text node.
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    /// The element, if this node is one.
    #[must_use]
    pub const fn as_element(&self) -> Option<&Element> {
        match self {
            Self::Element(element) => Some(element),
            _ => None,
        }
    }

    /// Concatenated text of this node and its descendants.
    #[must_use]
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            Self::Element(element) => {
                for child in &element.children {
                    child.collect_text(out);
                }
            },
            Self::Text { text } => out.push_str(text),
            Self::Comment { .. } => {},
        }
    }
}

/// An element attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attribute {
    /// Attribute name.
    pub name: String,
    /// Attribute value, unescaped.
    pub value: String,
}

/// An element in a detached markup tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Element {
    /// Lowercase tag name.
    pub name: String,
    /// Attributes in source order.
    pub attributes: Vec<Attribute>,
    /// Child nodes in source order.
    pub children: Vec<Node>,
}

impl Element {
    /// Create an empty element.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Add an attribute using builder pattern.
    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push(Attribute {
            name: name.into(),
            value: value.into(),
        });
        self
    }

    /// Append a child using builder pattern.
    #[must_use]
    pub fn with_child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    /// Look up an attribute value by name.
    #[must_use]
    pub fn get_attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|attr| attr.name == name)
            .map(|attr| attr.value.as_str())
    }

    /// Whether the `class` attribute contains `class`.
    #[must_use]
    pub fn has_class(&self, class: &str) -> bool {
        self.get_attribute("class")
            .is_some_and(|classes| classes.split_whitespace().any(|c| c == class))
    }

    /// Concatenated text of all descendants.
    #[must_use]
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        for child in &self.children {
            child.collect_text(&mut out);
        }
        out
    }

    /// Copy an element out of a parsed document, descendants included.
    ///
    /// Attributes are sorted by name so serialization is stable.
    #[must_use]
    pub fn from_parsed(element: ElementRef<'_>) -> Self {
        let value = element.value();
        let mut attributes: Vec<Attribute> = value
            .attrs()
            .map(|(name, value)| Attribute {
                name: name.to_string(),
                value: value.to_string(),
            })
            .collect();
        attributes.sort_by(|a, b| a.name.cmp(&b.name));

        Self {
            name: value.name().to_string(),
            attributes,
            children: children_of(element),
        }
    }

    /// Copy an element without its children, like a shallow `cloneNode()`.
    #[must_use]
    pub fn shallow_from_parsed(element: ElementRef<'_>) -> Self {
        let mut copy = Self::from_parsed(element);
        copy.children.clear();
        copy
    }
}

/// Copy the children of a parsed element into owned nodes.
///
/// A `<template>` keeps its content in a document fragment below the
/// element; that fragment is flattened so the template's content comes out
/// as its children. Doctypes and processing instructions are dropped.
#[must_use]
pub fn children_of(element: ElementRef<'_>) -> Vec<Node> {
    element
        .children()
        .flat_map(|child| {
            let (own, fragment) = if matches!(child.value(), scraper::Node::Fragment) {
                (None, Some(child.children()))
            } else {
                (Some(child), None)
            };
            own.into_iter().chain(fragment.into_iter().flatten())
        })
        .filter_map(|child| match child.value() {
            scraper::Node::Element(_) => {
                ElementRef::wrap(child).map(|el| Node::Element(Element::from_parsed(el)))
            },
            scraper::Node::Text(text) => Some(Node::text(text.text.to_string())),
            scraper::Node::Comment(comment) => Some(Node::Comment {
                comment: comment.comment.to_string(),
            }),
            _ => None,
        })
        .collect()
}

/// Serialize nodes back to HTML.
#[must_use]
pub fn to_html(nodes: &[Node]) -> String {
    let mut out = String::new();
    for node in nodes {
        write_node(node, false, &mut out);
    }
    out
}

fn write_node(node: &Node, raw_text: bool, out: &mut String) {
    match node {
        Node::Element(element) => write_element(element, out),
        Node::Text { text } if raw_text => out.push_str(text),
        Node::Text { text } => out.push_str(&html_escape::encode_text(text)),
        Node::Comment { comment } => {
            out.push_str("<!--");
            out.push_str(comment);
            out.push_str("-->");
        },
    }
}

fn write_element(element: &Element, out: &mut String) {
    out.push('<');
    out.push_str(&element.name);
    for attr in &element.attributes {
        out.push(' ');
        out.push_str(&attr.name);
        out.push_str("=\"");
        out.push_str(&html_escape::encode_double_quoted_attribute(&attr.value));
        out.push('"');
    }
    out.push('>');

    if VOID_ELEMENTS.contains(&element.name.as_str()) {
        return;
    }

    let raw_text = RAW_TEXT_ELEMENTS.contains(&element.name.as_str());
    for child in &element.children {
        write_node(child, raw_text, out);
    }

    out.push_str("</");
    out.push_str(&element.name);
    out.push('>');
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use scraper::{Html, Selector};

    #[test]
    fn test_serialization_escapes_text_and_attributes() {
        let link = Element::new("a")
            .with_attribute("href", "#/a\"b")
            .with_child(Node::text("1 < 2"));
        assert_eq!(
            to_html(&[Node::Element(link)]),
            "<a href=\"#/a&quot;b\">1 &lt; 2</a>"
        );
    }

    #[test]
    fn test_void_and_raw_text_elements() {
        let nodes = vec![
            Node::Element(Element::new("link").with_attribute("href", "css/site.css")),
            Node::Element(Element::new("style").with_child(Node::text("p > a { color: red }"))),
        ];
        assert_eq!(
            to_html(&nodes),
            "<link href=\"css/site.css\"><style>p > a { color: red }</style>"
        );
    }

    #[test]
    fn test_from_parsed_copies_the_subtree() {
        let html = Html::parse_fragment("<div class=\"a b\"><p>Hi <b>there</b></p><!--x--></div>");
        let selector = Selector::parse("div").unwrap();
        let div = Element::from_parsed(html.select(&selector).next().unwrap());

        assert!(div.has_class("b"));
        assert!(!div.has_class("c"));
        assert_eq!(div.text_content(), "Hi there");
        assert_eq!(div.children.len(), 2);
        assert_eq!(to_html(&div.children), "<p>Hi <b>there</b></p><!--x-->");
    }

    #[test]
    fn test_template_content_is_copied_as_children() {
        let html = Html::parse_document("<h1>T</h1><template><p>inside</p>text</template>");
        let selector = Selector::parse("template").unwrap();
        let template = html.select(&selector).next().unwrap();

        let content = children_of(template);
        assert_eq!(to_html(&content), "<p>inside</p>text");
        assert_eq!(
            to_html(&[Node::Element(Element::from_parsed(template))]),
            "<template><p>inside</p>text</template>"
        );
    }

    #[test]
    fn test_shallow_copy_drops_children() {
        let html = Html::parse_fragment("<ul id=\"menu\"><li>one</li></ul>");
        let selector = Selector::parse("ul").unwrap();
        let ul = Element::shallow_from_parsed(html.select(&selector).next().unwrap());
        assert_eq!(ul.get_attribute("id"), Some("menu"));
        assert!(ul.children.is_empty());
    }
}
