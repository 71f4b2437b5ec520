//! Element classification for traversal and tagging.
//!
//! Each element is exactly one of three things: a *block* that may carry the
//! direction marker, an *opaque* container whose contents are never scanned
//! or tagged (code samples, scripts, styles), or *neutral*, which traversal
//! passes through without it being a tagging target.

use super::ElementData;

/// Class used by pre-rendered syntax highlighters; treated like a code tag.
pub const HIGHLIGHT_CLASS: &str = "hljs";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// Eligible to carry the direction marker.
    Block,
    /// Never entered, never tagged.
    Opaque,
    /// Neither; the ancestor walk keeps going.
    Neutral,
}

/// Classify an element from its local facts alone (tag name + class list).
pub fn classify(element: &ElementData) -> Classification {
    if element.has_class(HIGHLIGHT_CLASS) {
        return Classification::Opaque;
    }
    match element.tag() {
        "code" | "pre" | "script" | "style" | "noscript" => Classification::Opaque,
        "p" | "div" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6" | "li" | "td" | "th"
        | "blockquote" | "article" | "section" | "main" => Classification::Block,
        _ => Classification::Neutral,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::DomTree;

    fn classify_tag(tag: &str) -> Classification {
        let mut dom = DomTree::new();
        let el = dom.create_element(tag);
        classify(dom.element(el).unwrap())
    }

    #[test]
    fn prose_containers_are_blocks() {
        for tag in ["p", "div", "h1", "h6", "li", "td", "th", "blockquote", "article", "section", "main"] {
            assert_eq!(classify_tag(tag), Classification::Block, "{tag}");
        }
    }

    #[test]
    fn code_like_containers_are_opaque() {
        for tag in ["code", "pre", "script", "style", "noscript"] {
            assert_eq!(classify_tag(tag), Classification::Opaque, "{tag}");
        }
    }

    #[test]
    fn inline_elements_are_neutral() {
        for tag in ["span", "a", "em", "strong", "b"] {
            assert_eq!(classify_tag(tag), Classification::Neutral, "{tag}");
        }
    }

    #[test]
    fn highlighted_code_class_makes_any_element_opaque() {
        let mut dom = DomTree::new();
        let el = dom.create_element("div");
        dom.add_class(el, HIGHLIGHT_CLASS).unwrap();
        assert_eq!(classify(dom.element(el).unwrap()), Classification::Opaque);
    }
}
