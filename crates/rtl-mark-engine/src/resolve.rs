//! Block-ancestor resolution.

use crate::dom::{Classification, DomTree, NodeId, classify};

/// Find the nearest ancestor of `node` that may carry the direction marker.
///
/// Walks strictly upward from the node's parent. Reaching `body` or `html`
/// means the text sits outside any recognized block and nothing is tagged.
/// An opaque ancestor (code, script, style, highlighted code) anywhere
/// before the first block short-circuits the walk: a paragraph nested
/// inside a code sample is never a tagging target.
pub fn find_taggable_ancestor(dom: &DomTree, node: NodeId) -> Option<NodeId> {
    let mut cursor = dom.parent(node);
    while let Some(id) = cursor {
        let element = dom.element(id)?;
        if element.tag() == "body" || element.tag() == "html" {
            return None;
        }
        match classify(element) {
            Classification::Opaque => return None,
            Classification::Block => return Some(id),
            Classification::Neutral => {}
        }
        cursor = dom.parent(id);
    }
    None
}
