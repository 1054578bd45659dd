//! Typed access to a rendered DOM snapshot

use scraper::{ElementRef, Html, Selector};

/// A parsed snapshot of the live document, as serialized by the renderer
pub struct RenderedDom {
    document: Html,
    blank: bool,
}

impl RenderedDom {
    /// Parses a serialized document
    ///
    /// The HTML parser always synthesizes an `<html>` root, so an all-whitespace snapshot is
    /// remembered as blank and exposes no root element.
    pub fn parse(snapshot: &str) -> Self {
        Self {
            document: Html::parse_document(snapshot),
            blank: snapshot.trim().is_empty(),
        }
    }

    /// The document's root element, or None for a blank snapshot
    pub fn root(&self) -> Option<NodeHandle<'_>> {
        if self.blank {
            return None;
        }
        Some(NodeHandle {
            element: self.document.root_element(),
        })
    }

    /// All elements matching a CSS selector, in document order
    ///
    /// An unparseable selector matches nothing.
    pub fn select(&self, css: &str) -> Vec<NodeHandle<'_>> {
        if self.blank {
            return Vec::new();
        }
        match Selector::parse(css) {
            Ok(selector) => self
                .document
                .select(&selector)
                .map(|element| NodeHandle { element })
                .collect(),
            Err(e) => {
                tracing::debug!("Ignoring invalid selector {:?}: {:?}", css, e);
                Vec::new()
            }
        }
    }

    /// First element matching a CSS selector
    pub fn first(&self, css: &str) -> Option<NodeHandle<'_>> {
        self.select(css).into_iter().next()
    }
}

/// One element of a [`RenderedDom`]
#[derive(Clone, Copy)]
pub struct NodeHandle<'a> {
    element: ElementRef<'a>,
}

impl<'a> NodeHandle<'a> {
    /// Lowercase tag name
    pub fn tag(&self) -> &'a str {
        self.element.value().name()
    }

    pub fn attr(&self, name: &str) -> Option<&'a str> {
        self.element.value().attr(name)
    }

    /// Attribute value, trimmed, with blank values treated as absent
    pub fn attr_trimmed(&self, name: &str) -> Option<&'a str> {
        self.attr(name).map(str::trim).filter(|value| !value.is_empty())
    }

    /// Whether a space-separated attribute (such as `rel`) holds a token, ignoring case
    pub fn has_token(&self, name: &str, token: &str) -> bool {
        self.attr(name).map_or(false, |value| {
            value
                .split_ascii_whitespace()
                .any(|t| t.eq_ignore_ascii_case(token))
        })
    }

    /// All descendant text, exactly as in the document
    pub fn text(&self) -> String {
        self.element.text().collect()
    }

    pub(crate) fn element(&self) -> ElementRef<'a> {
        self.element
    }
}

/// Collapses runs of whitespace into single spaces and trims the ends
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
