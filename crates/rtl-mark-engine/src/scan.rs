//! Text-node traversal and the detect-resolve-tag pipeline.

use crate::detect::is_rtl_script;
use crate::dom::{Classification, DomTree, NodeData, NodeId, classify};
use crate::marker::apply_marker;
use crate::resolve::find_taggable_ancestor;
use crate::state::StateResolver;

/// Walk every text node under `root` and tag the blocks containing RTL
/// script. Opaque containers are not entered. The traversal is built fresh
/// per call from an explicit id stack, so tagging (which only touches class
/// lists) cannot invalidate it.
///
/// Inactive state makes the whole call a no-op; the per-node path re-checks
/// on its own, so callers that race a state flip never over-tag.
pub fn scan(dom: &mut DomTree, root: NodeId, resolver: &StateResolver) {
    if !resolver.effective_state().is_active {
        return;
    }
    let mut stack = vec![root];
    while let Some(id) = stack.pop() {
        let is_text = matches!(dom.data(id), Some(NodeData::Text(_)));
        if is_text {
            process_text_node(dom, id, resolver);
            continue;
        }
        let Some(element) = dom.element(id) else {
            continue;
        };
        if classify(element) == Classification::Opaque {
            continue;
        }
        stack.extend(dom.children(id).iter().rev().copied());
    }
}

/// The single-node pipeline, shared by the full scan and the watcher's
/// character-data path: filter, detect, resolve, tag.
pub fn process_text_node(dom: &mut DomTree, node: NodeId, resolver: &StateResolver) {
    if !resolver.effective_state().is_active {
        return;
    }
    let Some(text) = dom.text(node) else {
        return;
    };
    if text.trim().is_empty() {
        return;
    }
    if !is_rtl_script(text) {
        return;
    }
    if let Some(parent) = dom.parent(node)
        && let Some(element) = dom.element(parent)
        && classify(element) == Classification::Opaque
    {
        return;
    }
    if let Some(block) = find_taggable_ancestor(dom, node) {
        apply_marker(dom, block);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::parse_html;
    use crate::marker::RTL_MARKER_CLASS;
    use crate::state::{GlobalSettings, StateResolver};

    fn active() -> StateResolver {
        StateResolver::new(GlobalSettings::default(), None)
    }

    fn inactive() -> StateResolver {
        StateResolver::new(
            GlobalSettings {
                global_enabled: false,
                use_alt_font: true,
            },
            None,
        )
    }

    fn marked_tags(dom: &DomTree) -> Vec<String> {
        dom.descendants(dom.root())
            .filter(|&id| dom.has_class(id, RTL_MARKER_CLASS))
            .map(|id| dom.tag(id).unwrap_or("?").to_string())
            .collect()
    }

    #[test]
    fn mixed_content_paragraph_is_marked() {
        let mut dom = parse_html("<p>Hello سلام</p>");
        let body = dom.body().unwrap();
        scan(&mut dom, body, &active());
        assert_eq!(marked_tags(&dom), vec!["p"]);
    }

    #[test]
    fn latin_only_document_is_untouched() {
        let mut dom = parse_html("<p>Hello world</p><li>plain</li>");
        let body = dom.body().unwrap();
        scan(&mut dom, body, &active());
        assert!(marked_tags(&dom).is_empty());
    }

    #[test]
    fn scanning_twice_changes_nothing_after_the_first_pass() {
        let mut dom = parse_html("<p>سلام</p><div>دنیا</div>");
        let body = dom.body().unwrap();
        scan(&mut dom, body, &active());
        let after_first = marked_tags(&dom);
        scan(&mut dom, body, &active());
        assert_eq!(marked_tags(&dom), after_first);
    }

    #[test]
    fn rtl_inside_code_marks_nothing_anywhere() {
        let mut dom = parse_html("<div><pre><code>سلام</code></pre></div>");
        let body = dom.body().unwrap();
        scan(&mut dom, body, &active());
        assert!(marked_tags(&dom).is_empty());
    }

    #[test]
    fn opaque_sibling_does_not_shadow_prose() {
        let mut dom = parse_html("<div><code>سلام</code><p>دنیا</p></div>");
        let body = dom.body().unwrap();
        scan(&mut dom, body, &active());
        assert_eq!(marked_tags(&dom), vec!["p"]);
    }

    #[test]
    fn highlighted_block_is_not_entered() {
        let mut dom = parse_html(r#"<div class="hljs"><p>سلام</p></div>"#);
        let body = dom.body().unwrap();
        scan(&mut dom, body, &active());
        assert!(marked_tags(&dom).is_empty());
    }

    #[test]
    fn inactive_scan_is_a_no_op() {
        let mut dom = parse_html("<p>سلام</p>");
        let body = dom.body().unwrap();
        scan(&mut dom, body, &inactive());
        assert!(marked_tags(&dom).is_empty());
    }

    #[test]
    fn whitespace_only_text_is_skipped() {
        let mut dom = parse_html("<p>   \n\t  </p>");
        let body = dom.body().unwrap();
        scan(&mut dom, body, &active());
        assert!(marked_tags(&dom).is_empty());
    }

    #[test]
    fn nearest_block_wins_over_outer_blocks() {
        let mut dom = parse_html("<article><div><p>سلام</p></div></article>");
        let body = dom.body().unwrap();
        scan(&mut dom, body, &active());
        assert_eq!(marked_tags(&dom), vec!["p"]);
    }

    #[test]
    fn text_directly_in_body_marks_nothing() {
        let mut dom = parse_html("سلام");
        let body = dom.body().unwrap();
        scan(&mut dom, body, &active());
        assert!(marked_tags(&dom).is_empty());
    }

    #[test]
    fn single_node_path_respects_opaque_parent() {
        let mut dom = parse_html("<p><code>سلام</code></p>");
        let text = dom
            .descendants(dom.body().unwrap())
            .find(|&id| dom.text(id).is_some())
            .unwrap();
        process_text_node(&mut dom, text, &active());
        assert!(marked_tags(&dom).is_empty());
    }
}
