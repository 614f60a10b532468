// src/extract/html.rs
// =============================================================================
// This module wraps a parsed HTML page.
//
// We use the `scraper` crate which:
// - Parses HTML into a DOM (Document Object Model)
// - Supports CSS selectors for finding elements
// - Is built on html5ever (Mozilla's HTML parser), which never rejects
//   markup: broken HTML still produces a (best effort) tree
//
// The rest of the crate only needs three views of a page:
// - anchors(): every <a href> with its raw href and visible link text
// - visible_text(): what a reader would see (no <script>/<style> bodies)
// - markup(): the tree serialized back to HTML (for scanning attributes)
// =============================================================================

use scraper::{Html, Node, Selector};

/// One `<a href>` on the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anchor {
    /// The href exactly as written in the page (may be relative)
    pub href: String,
    /// Visible link text, whitespace collapsed
    pub text: String,
}

pub struct ParsedPage {
    document: Html,
}

impl ParsedPage {
    pub fn parse(content: &str) -> Self {
        Self {
            document: Html::parse_document(content),
        }
    }

    // Collects all links on the page
    //
    // Example:
    //   html = "<a href='/contact'> Contact   us </a>"
    //   result = [Anchor { href: "/contact", text: "Contact us" }]
    pub fn anchors(&self) -> Vec<Anchor> {
        // "a[href]" means "all <a> tags that have an href attribute"
        let selector = match Selector::parse("a[href]") {
            Ok(selector) => selector,
            Err(_) => return Vec::new(),
        };

        self.document
            .select(&selector)
            .filter_map(|element| {
                let href = element.value().attr("href")?;
                Some(Anchor {
                    href: href.to_string(),
                    text: collapse_whitespace(&element.text().collect::<Vec<_>>().join(" ")),
                })
            })
            .collect()
    }

    /// All text nodes outside script-like elements, joined by single spaces.
    pub fn visible_text(&self) -> String {
        let mut chunks = Vec::new();

        for node in self.document.root_element().descendants() {
            if let Node::Text(text) = node.value() {
                let hidden = node
                    .parent()
                    .and_then(|parent| parent.value().as_element().map(|el| is_hidden_tag(el.name())))
                    .unwrap_or(false);

                let trimmed = text.trim();
                if !hidden && !trimmed.is_empty() {
                    chunks.push(trimmed);
                }
            }
        }

        chunks.join(" ")
    }

    pub fn markup(&self) -> String {
        self.document.html()
    }
}

fn is_hidden_tag(name: &str) -> bool {
    matches!(name, "script" | "style" | "noscript" | "template")
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. What does .value() do?
//    - element is an ElementRef (reference to an HTML element)
//    - .value() gets the underlying Element
//    - .attr("href") gets the value of the href attribute
//
// 2. What is Node::Text?
//    - The DOM tree holds different node kinds (elements, text, comments...)
//    - Matching on Node::Text(text) picks out the text nodes only
//
// 3. Why filter_map?
//    - It maps and filters in one step: returning None drops the item
//    - The ? inside the closure returns None early if there is no href
// -----------------------------------------------------------------------------
