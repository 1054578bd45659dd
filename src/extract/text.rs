//! Visible text walk
//!
//! One pass over the document produces both the visible text (for the word count and the
//! content hash) and the heading texts, so the two can never disagree.

use super::dom::{collapse_whitespace, NodeHandle};
use super::record::Heading;
use scraper::ElementRef;

/// Elements whose content is never rendered as page text
const NON_VISIBLE_TAGS: &[&str] = &[
    "script", "style", "noscript", "template", "head", "svg", "iframe",
];

/// Elements rendered on their own line or in their own box; their edges separate words.
/// Everything else (`a`, `span`, `b`, `em`, ...) is inline and joins adjacent text.
const BLOCK_TAGS: &[&str] = &[
    "address", "article", "aside", "blockquote", "body", "br", "caption", "dd", "details",
    "dialog", "div", "dl", "dt", "fieldset", "figcaption", "figure", "footer", "form", "h1",
    "h2", "h3", "h4", "h5", "h6", "header", "hr", "html", "img", "input", "li", "main", "nav",
    "ol", "option", "p", "pre", "section", "select", "summary", "table", "tbody", "td",
    "textarea", "tfoot", "th", "thead", "tr", "ul",
];

/// Output of the visible text walk
#[derive(Debug, Default)]
pub struct VisibleText {
    /// Whitespace-collapsed visible text of the whole document
    pub text: String,
    /// Headings in document order
    pub headings: Vec<Heading>,
}

impl VisibleText {
    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }
}

/// Walks the document from its root and collects visible text
pub fn walk_visible_text(root: NodeHandle<'_>) -> VisibleText {
    let mut walker = Walker::default();
    let mut raw = String::new();
    if is_visible(root.element()) {
        walker.visit(root.element(), &mut raw);
    }

    VisibleText {
        text: collapse_whitespace(&raw),
        headings: walker.headings,
    }
}

#[derive(Default)]
struct Walker {
    headings: Vec<Heading>,
}

impl Walker {
    fn visit(&mut self, element: ElementRef<'_>, acc: &mut String) {
        for child in element.children() {
            if let Some(text) = child.value().as_text() {
                acc.push_str(text);
                continue;
            }

            let Some(child) = ElementRef::wrap(child) else {
                continue;
            };
            if !is_visible(child) {
                continue;
            }

            let block = is_block(child.value().name());
            if block {
                acc.push(' ');
            }

            match heading_level(child.value().name()) {
                Some(level) => {
                    let mut heading_text = String::new();
                    self.visit(child, &mut heading_text);
                    self.headings.push(Heading {
                        level,
                        text: collapse_whitespace(&heading_text),
                    });
                    acc.push_str(&heading_text);
                }
                None => self.visit(child, acc),
            }

            if block {
                acc.push(' ');
            }
        }
    }
}

fn is_block(tag: &str) -> bool {
    BLOCK_TAGS.contains(&tag)
}

fn heading_level(tag: &str) -> Option<u8> {
    match tag {
        "h1" => Some(1),
        "h2" => Some(2),
        "h3" => Some(3),
        "h4" => Some(4),
        "h5" => Some(5),
        "h6" => Some(6),
        _ => None,
    }
}

/// Whether an element (and therefore its subtree) is rendered
fn is_visible(element: ElementRef<'_>) -> bool {
    let value = element.value();

    if NON_VISIBLE_TAGS.contains(&value.name()) {
        return false;
    }

    if value.attr("hidden").is_some() {
        return false;
    }

    if value
        .attr("aria-hidden")
        .map_or(false, |v| v.trim().eq_ignore_ascii_case("true"))
    {
        return false;
    }

    match value.attr("style") {
        Some(style) => !style_hides(style),
        None => true,
    }
}

/// Inline styles that hide an element: `display:none`, `visibility:hidden`, or zero size
fn style_hides(style: &str) -> bool {
    let mut zero_width = false;
    let mut zero_height = false;

    for declaration in style.split(';') {
        let Some((property, value)) = declaration.split_once(':') else {
            continue;
        };
        let property = property.trim().to_ascii_lowercase();
        let value = value
            .trim()
            .trim_end_matches("!important")
            .trim()
            .to_ascii_lowercase();

        match property.as_str() {
            "display" if value == "none" => return true,
            "visibility" if value == "hidden" => return true,
            "width" => zero_width = is_zero_length(&value),
            "height" => zero_height = is_zero_length(&value),
            _ => {}
        }
    }

    zero_width && zero_height
}

fn is_zero_length(value: &str) -> bool {
    let number = value.trim_end_matches(|c: char| c.is_ascii_alphabetic() || c == '%');
    number.parse::<f64>().map_or(false, |n| n == 0.0)
}
