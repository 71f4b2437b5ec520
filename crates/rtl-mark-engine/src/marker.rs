//! Marker and font-preference class application.
//!
//! The class names are public API: the styling layer keys off them and they
//! must not change between releases. This module is the only code that
//! writes classes during normal processing; everything else reads.

use crate::dom::{DomTree, NodeId};

/// Applied to the nearest block ancestor of each detected RTL text node.
pub const RTL_MARKER_CLASS: &str = "rtl-content-block";

/// Applied to the body when the alternate-font preference is on and the
/// engine is active.
pub const ALT_FONT_CLASS: &str = "rtl-alt-font";

/// Add the marker to `el` if absent. Re-applying is a no-op, not an error.
pub fn apply_marker(dom: &mut DomTree, el: NodeId) {
    match dom.add_class(el, RTL_MARKER_CLASS) {
        Ok(true) => tracing::trace!(?el, "marked block"),
        Ok(false) => {}
        Err(err) => tracing::debug!(%err, "skipping marker on unreachable node"),
    }
}

/// Strip the marker from every element under `root` that carries it. Used
/// only when the engine goes inactive; normal operation never removes a
/// marker once applied.
pub fn clear_all_markers(dom: &mut DomTree, root: NodeId) {
    let marked: Vec<NodeId> = dom
        .descendants(root)
        .filter(|&id| dom.has_class(id, RTL_MARKER_CLASS))
        .collect();
    let count = marked.len();
    for el in marked {
        let _ = dom.remove_class(el, RTL_MARKER_CLASS);
    }
    if count > 0 {
        tracing::debug!(count, "cleared direction markers");
    }
}

/// Toggle the document-wide font class on the body. A tree without a body
/// has nowhere to put it, so this quietly does nothing there.
pub fn set_font_preference(dom: &mut DomTree, active: bool) {
    let Some(body) = dom.body() else {
        return;
    };
    let _ = if active {
        dom.add_class(body, ALT_FONT_CLASS)
    } else {
        dom.remove_class(body, ALT_FONT_CLASS)
    };
}
