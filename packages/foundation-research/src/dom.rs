//! Small scraper helpers shared by the scanners.
//!
//! `Html` is not `Send`, so every caller parses and scans inside a synchronous
//! function and only carries owned results across an `.await`.

use scraper::{ElementRef, Html, Selector};

/// Parse a selector, logging and skipping invalid ones.
pub fn selector(selector_str: &str) -> Option<Selector> {
    match Selector::parse(selector_str) {
        Ok(s) => Some(s),
        Err(e) => {
            tracing::debug!(selector = selector_str, error = ?e, "Invalid selector skipped");
            None
        }
    }
}

/// Concatenated text of an element and its descendants.
pub fn element_text(element: &ElementRef<'_>) -> String {
    element.text().collect::<String>()
}

/// Text of the `<title>` element, trimmed. Empty when missing.
pub fn document_title(document: &Html) -> String {
    selector("title")
        .and_then(|s| {
            document
                .select(&s)
                .next()
                .map(|el| element_text(&el).trim().to_string())
        })
        .unwrap_or_default()
}

/// Full document text.
pub fn document_text(document: &Html) -> String {
    document.root_element().text().collect::<Vec<_>>().join(" ")
}

/// `content` of the first element matching `selector_str`, when non-empty.
pub fn meta_content(document: &Html, selector_str: &str) -> Option<String> {
    let s = selector(selector_str)?;
    document
        .select(&s)
        .next()
        .and_then(|el| el.value().attr("content"))
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
}

/// Text of the parent element, empty when the parent is not an element.
pub fn parent_text(element: &ElementRef<'_>) -> String {
    element
        .parent()
        .and_then(ElementRef::wrap)
        .map(|p| element_text(&p))
        .unwrap_or_default()
}

/// Text of the grandparent element, empty when missing.
pub fn grandparent_text(element: &ElementRef<'_>) -> String {
    element
        .parent()
        .and_then(|p| p.parent())
        .and_then(ElementRef::wrap)
        .map(|g| element_text(&g))
        .unwrap_or_default()
}

/// Nearest ancestor (or self) with the given tag name.
pub fn closest<'a>(element: &ElementRef<'a>, tag: &str) -> Option<ElementRef<'a>> {
    if element.value().name() == tag {
        return Some(*element);
    }
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .find(|a| a.value().name() == tag)
}
